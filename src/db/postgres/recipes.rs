use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{like_pattern, PgStore};
use crate::{
    db::RecipeStore,
    error::{AppError, AppResult},
    models::{
        Comment, Ingredient, LikeToggle, NutritionalFacts, Recipe, RecipeFilter, Review,
    },
};

const RECIPE_COLUMNS: &str = "id, owner_id, title, description, ingredients, steps, image, \
     cuisine, cooking_time, nutritional_facts, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    ingredients: Json<Vec<Ingredient>>,
    steps: Vec<String>,
    image: Option<String>,
    cuisine: Option<String>,
    cooking_time: Option<i32>,
    nutritional_facts: Option<Json<NutritionalFacts>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            ingredients: row.ingredients.0,
            steps: row.steps,
            image: row.image,
            cuisine: row.cuisine,
            cooking_time: row.cooking_time,
            nutritional_facts: row.nutritional_facts.map(|facts| facts.0),
            likes: Vec::new(),
            comments: Vec::new(),
            reviews: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgStore {
    /// Loads likes, comments and reviews for a batch of recipe rows
    async fn hydrate(&self, rows: Vec<RecipeRow>) -> AppResult<Vec<Recipe>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let likes = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT recipe_id, user_id FROM recipe_likes WHERE recipe_id = ANY($1) ORDER BY liked_at",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String, DateTime<Utc>)>(
            r#"
            SELECT id, recipe_id, user_id, text, created_at
            FROM recipe_comments
            WHERE recipe_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let reviews = sqlx::query_as::<_, (Uuid, Uuid, i16, Option<String>, DateTime<Utc>)>(
            r#"
            SELECT recipe_id, user_id, rating, review, created_at
            FROM recipe_reviews
            WHERE recipe_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut recipes: Vec<Recipe> = rows.into_iter().map(Recipe::from).collect();
        let index: HashMap<Uuid, usize> = recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();

        for (recipe_id, user_id) in likes {
            if let Some(&i) = index.get(&recipe_id) {
                recipes[i].likes.push(user_id);
            }
        }
        for (id, recipe_id, user_id, text, created_at) in comments {
            if let Some(&i) = index.get(&recipe_id) {
                recipes[i].comments.push(Comment {
                    id,
                    user_id,
                    text,
                    created_at,
                });
            }
        }
        for (recipe_id, user_id, rating, review, created_at) in reviews {
            if let Some(&i) = index.get(&recipe_id) {
                recipes[i].reviews.push(Review {
                    user_id,
                    rating,
                    review,
                    created_at,
                });
            }
        }

        Ok(recipes)
    }
}

#[async_trait::async_trait]
impl RecipeStore for PgStore {
    async fn insert_recipe(&self, recipe: Recipe) -> AppResult<Recipe> {
        sqlx::query(
            r#"
            INSERT INTO recipes (id, owner_id, title, description, ingredients, steps, image,
                                 cuisine, cooking_time, nutritional_facts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(recipe.id)
        .bind(recipe.owner_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(Json(&recipe.ingredients))
        .bind(&recipe.steps)
        .bind(&recipe.image)
        .bind(&recipe.cuisine)
        .bind(recipe.cooking_time)
        .bind(recipe.nutritional_facts.map(Json))
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn find_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_recipes(&self, ids: &[Uuid]) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> AppResult<Vec<Recipe>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE TRUE"));

        if let Some(owner_id) = filter.owner_id {
            query.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(keyword) = &filter.keyword {
            let pattern = like_pattern(keyword);
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR cuisine ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(cuisine) = &filter.cuisine {
            query.push(" AND cuisine ILIKE ").push_bind(like_pattern(cuisine));
        }
        if !filter.ingredients.is_empty() {
            let patterns: Vec<String> = filter.ingredients.iter().map(|t| like_pattern(t)).collect();
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM jsonb_array_elements(ingredients) AS i \
                     WHERE i->>'name' ILIKE ANY(",
                )
                .push_bind(patterns.clone())
                .push(") OR i->>'category' ILIKE ANY(")
                .push_bind(patterns)
                .push("))");
        }
        if let Some(max) = filter.max_cooking_time {
            query.push(" AND cooking_time <= ").push_bind(max);
        }
        query.push(" ORDER BY created_at DESC, id");

        let rows = query
            .build_query_as::<RecipeRow>()
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn update_recipe(&self, recipe: &Recipe) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET title = $2, description = $3, ingredients = $4, steps = $5, image = $6,
                cuisine = $7, cooking_time = $8, nutritional_facts = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(Json(&recipe.ingredients))
        .bind(&recipe.steps)
        .bind(&recipe.image)
        .bind(&recipe.cuisine)
        .bind(recipe.cooking_time)
        .bind(recipe.nutritional_facts.map(Json))
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe not found"));
        }
        Ok(())
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn toggle_like(&self, recipe_id: Uuid, user_id: Uuid) -> AppResult<Option<LikeToggle>> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(recipe_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM recipe_likes WHERE recipe_id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let liked = removed.rows_affected() == 0;
        if liked {
            sqlx::query("INSERT INTO recipe_likes (recipe_id, user_id) VALUES ($1, $2)")
                .bind(recipe_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_likes WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(LikeToggle {
            liked,
            likes: usize::try_from(likes).unwrap_or_default(),
        }))
    }

    async fn add_comment(&self, recipe_id: Uuid, comment: Comment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_comments (id, recipe_id, user_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(recipe_id)
        .bind(comment.user_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_review(&self, recipe_id: Uuid, review: Review) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO recipe_reviews (recipe_id, user_id, rating, review, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (recipe_id, user_id) DO NOTHING
            "#,
        )
        .bind(recipe_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.review)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
