use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CreatedMediaResponse {
    pub message: String,
    pub id: i64,
    pub image_src: String,
}
