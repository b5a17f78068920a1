pub mod client;
pub mod parser;
pub mod types;

pub use client::YahooChartClient;
pub use parser::parse_chart_response;
