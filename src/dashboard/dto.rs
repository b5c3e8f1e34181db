use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyTotal {
    pub hour: String, // "H:00"
    pub total_input: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub hourly: Vec<HourlyTotal>,
    pub recent_images: Vec<String>,
}
