use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::shopmodel::{Claim, NewShopItem};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateShopItemDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(
        required(message = "Cost is required"),
        range(min = 0, message = "Cost must not be negative")
    )]
    pub cost: Option<i64>,

    #[validate(url(message = "Image must be a valid URL"))]
    pub image: Option<String>,
}

impl From<CreateShopItemDto> for NewShopItem {
    fn from(dto: CreateShopItemDto) -> Self {
        NewShopItem {
            name: dto.name.trim().to_string(),
            description: dto.description.trim().to_string(),
            cost: dto.cost.unwrap_or_default(),
            image: dto.image.filter(|image| !image.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponseDto {
    pub success: bool,
    pub message: String,
    pub claim: Claim,
    pub remaining_points: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimListResponseDto {
    pub status: String,
    pub claims: Vec<Claim>,
}
