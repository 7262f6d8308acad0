use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct MarketQuery {
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}
