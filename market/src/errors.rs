use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider url: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid instrument identifier: {0:?}")]
    InvalidSymbol(String),

    #[error("provider returned status {status}")]
    Status { status: u16 },

    /// Error reported in the provider payload, e.g. an unknown symbol.
    #[error("{code}: {description}")]
    Provider { code: String, description: String },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("no price data returned for {symbol}")]
    EmptySeries { symbol: String },
}
