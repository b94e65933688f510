pub mod trend_api;
