use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Menu section of a restaurant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sellable menu item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 80), custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 80), custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateCategory {
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if self.description.is_some() {
            category.description = self.description;
        }
        if let Some(order) = self.display_order {
            category.display_order = order;
        }
        if let Some(active) = self.is_active {
            category.is_active = active;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

impl UpdateProduct {
    pub fn apply_to(self, product: &mut Product) {
        if self.category_id.is_some() {
            product.category_id = self.category_id;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if self.description.is_some() {
            product.description = self.description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if self.image_url.is_some() {
            product.image_url = self.image_url;
        }
        if let Some(available) = self.is_available {
            product.is_available = available;
        }
    }
}

/// Query parameters for listing menu entries
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
}

/// A category together with the products sold under it
#[derive(Debug, Clone, Serialize)]
pub struct MenuSection {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Public menu of a restaurant
#[derive(Debug, Clone, Serialize, Default)]
pub struct RestaurantMenu {
    pub sections: Vec<MenuSection>,
    /// Available products with no (active) category
    pub uncategorized: Vec<Product>,
}

impl RestaurantMenu {
    /// Groups available products under active categories, keeping category order
    pub fn assemble(categories: Vec<Category>, products: Vec<Product>) -> Self {
        let mut sections: Vec<MenuSection> = categories
            .into_iter()
            .filter(|c| c.is_active)
            .map(|category| MenuSection {
                category,
                products: Vec::new(),
            })
            .collect();
        let mut uncategorized = Vec::new();

        // Products of an inactive or missing category are hidden with it
        for product in products.into_iter().filter(|p| p.is_available) {
            match product.category_id {
                None => uncategorized.push(product),
                Some(cid) => {
                    if let Some(section) = sections.iter_mut().find(|s| s.category.id == cid) {
                        section.products.push(product);
                    }
                }
            }
        }

        Self {
            sections,
            uncategorized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uncategorized.is_empty() && self.sections.iter().all(|s| s.products.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(restaurant_id: Uuid, name: &str, order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_string(),
            description: None,
            display_order: order,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn product(restaurant_id: Uuid, category_id: Option<Uuid>, name: &str, price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            restaurant_id,
            category_id,
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assemble_groups_products_by_category() {
        let rid = Uuid::new_v4();
        let pizzas = category(rid, "Pizzas", 1);
        let drinks = category(rid, "Bebidas", 2);
        let products = vec![
            product(rid, Some(drinks.id), "Suco de laranja", dec!(8.00)),
            product(rid, Some(pizzas.id), "Margherita", dec!(45.00)),
            product(rid, None, "Brownie", dec!(12.00)),
        ];

        let menu = RestaurantMenu::assemble(vec![pizzas, drinks], products);

        assert_eq!(menu.sections.len(), 2);
        assert_eq!(menu.sections[0].category.name, "Pizzas");
        assert_eq!(menu.sections[0].products[0].name, "Margherita");
        assert_eq!(menu.sections[1].products[0].name, "Suco de laranja");
        assert_eq!(menu.uncategorized[0].name, "Brownie");
    }

    #[test]
    fn test_assemble_hides_unavailable_products_and_inactive_categories() {
        let rid = Uuid::new_v4();
        let mut hidden = category(rid, "Sazonal", 1);
        hidden.is_active = false;
        let mut sold_out = product(rid, None, "Torta", dec!(15.00));
        sold_out.is_available = false;
        let orphan = product(rid, Some(hidden.id), "Panetone", dec!(30.00));

        let brownie = product(rid, None, "Brownie", dec!(12.00));

        let menu = RestaurantMenu::assemble(vec![hidden], vec![sold_out, orphan, brownie]);

        assert!(menu.sections.is_empty());
        assert_eq!(menu.uncategorized.len(), 1);
        assert_eq!(menu.uncategorized[0].name, "Brownie");
        assert!(menu.uncategorized.iter().all(|p| p.name != "Panetone"));
    }

    #[test]
    fn test_empty_menu() {
        assert!(RestaurantMenu::assemble(vec![], vec![]).is_empty());
    }
}
