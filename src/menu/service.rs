use uuid::Uuid;

use crate::error::ApiError;
use crate::menu::{
    Category, CategoryRepository, CreateCategory, CreateProduct, Product, ProductRepository,
    RestaurantMenu, UpdateCategory, UpdateProduct,
};
use crate::validation::{AmountChecks, AmountRule};

/// Service for categories, products and the assembled menu
#[derive(Clone)]
pub struct MenuService {
    categories: CategoryRepository,
    products: ProductRepository,
}

impl MenuService {
    pub fn new(categories: CategoryRepository, products: ProductRepository) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub async fn create_category(&self, request: CreateCategory) -> Result<Category, ApiError> {
        let category = self.categories.create(&request).await.map_err(missing_restaurant)?;
        tracing::info!("Created category {} for restaurant {}", category.id, category.restaurant_id);
        Ok(category)
    }

    pub async fn list_categories(&self, restaurant_id: Uuid) -> Result<Vec<Category>, ApiError> {
        Ok(self.categories.find_by_restaurant(restaurant_id).await?)
    }

    pub async fn find_category(&self, id: Uuid) -> Result<Category, ApiError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category", id))
    }

    pub async fn update_category(&self, id: Uuid, request: UpdateCategory) -> Result<Category, ApiError> {
        let mut category = self.find_category(id).await?;
        request.apply_to(&mut category);
        Ok(self.categories.update(&category).await?)
    }

    pub async fn remove_category(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.categories.delete(id).await? {
            return Err(ApiError::not_found("Category", id));
        }
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    pub async fn create_product(&self, request: CreateProduct) -> Result<Product, ApiError> {
        AmountChecks::new()
            .check("price", Some(request.price), AmountRule::Positive)
            .finish()?;

        if let Some(category_id) = request.category_id {
            let category = self.find_category(category_id).await?;
            if category.restaurant_id != request.restaurant_id {
                return Err(ApiError::BadRequest(
                    "Category belongs to a different restaurant".to_string(),
                ));
            }
        }

        let product = self.products.create(&request).await.map_err(missing_restaurant)?;
        tracing::info!("Created product {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn list_products(
        &self,
        restaurant_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.find_by_restaurant(restaurant_id, category_id).await?)
    }

    pub async fn find_product(&self, id: Uuid) -> Result<Product, ApiError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", id))
    }

    /// Loads several products at once; missing ids are simply absent from the result
    pub async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.find_by_ids(ids).await?)
    }

    pub async fn update_product(&self, id: Uuid, request: UpdateProduct) -> Result<Product, ApiError> {
        AmountChecks::new()
            .check("price", request.price, AmountRule::Positive)
            .finish()?;

        let mut product = self.find_product(id).await?;
        if let Some(category_id) = request.category_id {
            let category = self.find_category(category_id).await?;
            if category.restaurant_id != product.restaurant_id {
                return Err(ApiError::BadRequest(
                    "Category belongs to a different restaurant".to_string(),
                ));
            }
        }
        request.apply_to(&mut product);
        Ok(self.products.update(&product).await?)
    }

    pub async fn remove_product(&self, id: Uuid) -> Result<(), ApiError> {
        let deleted = self.products.delete(id).await.map_err(|e| {
            if crate::db::is_foreign_key_violation(&e) {
                ApiError::Conflict {
                    message: "Product is referenced by existing orders; mark it unavailable instead"
                        .to_string(),
                }
            } else {
                ApiError::DatabaseError(e)
            }
        })?;
        if !deleted {
            return Err(ApiError::not_found("Product", id));
        }
        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    /// Active categories with their available products
    pub async fn menu_for_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantMenu, ApiError> {
        let categories = self.categories.find_by_restaurant(restaurant_id).await?;
        let products = self.products.find_by_restaurant(restaurant_id, None).await?;
        Ok(RestaurantMenu::assemble(categories, products))
    }
}

/// Inserts referencing an unknown restaurant surface as a client error
fn missing_restaurant(error: sqlx::Error) -> ApiError {
    if crate::db::is_foreign_key_violation(&error) {
        ApiError::BadRequest("Referenced restaurant does not exist".to_string())
    } else {
        ApiError::DatabaseError(error)
    }
}
