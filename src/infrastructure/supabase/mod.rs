pub mod meter_repo;
