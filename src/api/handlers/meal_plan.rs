use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{DayPlan, DayView, MealSlot, Meals},
    services::meal_plan::{self, ClearTarget},
};

const INVALID_MEAL_IDS: &str = "One or more meal IDs are invalid.";

/// Raw slot references as sent by the client
#[derive(Debug, Default, Deserialize)]
pub struct MealsRequest {
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
    pub snacks: Option<String>,
}

impl MealsRequest {
    fn parse(self) -> AppResult<Meals> {
        let slot = |raw: Option<String>| -> AppResult<Option<Uuid>> {
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(id) => Uuid::parse_str(id)
                    .map(Some)
                    .map_err(|_| AppError::invalid(INVALID_MEAL_IDS)),
            }
        };
        Ok(Meals {
            breakfast: slot(self.breakfast)?,
            lunch: slot(self.lunch)?,
            dinner: slot(self.dinner)?,
            snacks: slot(self.snacks)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SetDayRequest {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub meals: MealsRequest,
}

/// `category` names the meal slot to clear
#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    pub day: Option<String>,
    pub category: Option<String>,
}

impl ClearRequest {
    /// An empty body clears the whole plan; anything else must be valid JSON
    fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::invalid(format!("Invalid request body: {e}")))
    }

    fn target(self) -> AppResult<ClearTarget> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let day = present(self.day);
        let slot = present(self.category);
        match (day, slot) {
            (None, _) => Ok(ClearTarget::Everything),
            (Some(day), None) => Ok(ClearTarget::Day(day)),
            (Some(day), Some(slot)) => {
                let slot = slot.parse::<MealSlot>().map_err(|_| {
                    AppError::invalid(
                        "Invalid meal type. Must be breakfast, lunch, dinner, or snacks",
                    )
                })?;
                Ok(ClearTarget::Slot { day, slot })
            }
        }
    }
}

pub async fn set_day(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SetDayRequest>,
) -> AppResult<Json<Value>> {
    let day = DayPlan {
        day: payload.day.trim().to_string(),
        meals: payload.meals.parse()?,
    };
    let plan = meal_plan::set_day(
        state.meal_plans.as_ref(),
        state.recipes.as_ref(),
        user.id,
        day,
    )
    .await?;

    Ok(Json(json!({
        "message": "Meal plan updated successfully",
        "mealPlan": plan,
    })))
}

pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<DayView>>> {
    let plan = meal_plan::get_plan(state.meal_plans.as_ref(), state.recipes.as_ref(), user.id)
        .await?;
    Ok(Json(plan))
}

pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let target = ClearRequest::from_body(&body)?.target()?;

    let message = match &target {
        ClearTarget::Everything => "Meal plan cleared successfully".to_string(),
        ClearTarget::Day(day) => format!("Meal plan for {day} cleared successfully"),
        ClearTarget::Slot { day, slot } => format!("{slot} for {day} cleared successfully"),
    };

    let plan = meal_plan::clear(
        state.meal_plans.as_ref(),
        state.recipes.as_ref(),
        user.id,
        target,
    )
    .await?;

    Ok(Json(json!({
        "message": message,
        "mealPlan": plan,
    })))
}
