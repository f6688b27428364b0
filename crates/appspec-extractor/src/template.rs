//! Built-in results used when no provider is configured

use appspec_domain::{Entity, Feature, GenerationResult, UserRole};

const TASK_KEYWORDS: [&str; 2] = ["todo", "task"];
const STORE_KEYWORDS: [&str; 4] = ["shop", "store", "ecommerce", "e-commerce"];

/// Pick a template by keyword and build its result
///
/// Task keywords win over store keywords; anything else gets the generic
/// template. Matching is case-insensitive substring search.
pub fn template_result(text: &str) -> GenerationResult {
    let lower = text.to_lowercase();

    if TASK_KEYWORDS.iter().any(|k| lower.contains(k)) {
        task_manager()
    } else if STORE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        storefront()
    } else {
        generic()
    }
}

fn task_manager() -> GenerationResult {
    GenerationResult::from_parts(
        "TaskFlow",
        vec![
            Entity::new("User", &["id", "name", "email", "password"]),
            Entity::new(
                "Task",
                &["id", "title", "description", "status", "priority", "dueDate", "assigneeId"],
            ),
            Entity::new("Project", &["id", "name", "description", "ownerId"]),
        ],
        vec![
            UserRole::new("Admin", "Manages users, projects and settings"),
            UserRole::new("Manager", "Creates projects and assigns tasks to team members"),
            UserRole::new("Member", "Works on and updates assigned tasks"),
        ],
        vec![
            Feature::new("Task Management", "Create, edit, delete and complete tasks"),
            Feature::new("Task Assignment", "Assign tasks to team members"),
            Feature::new("Due Dates", "Set deadlines and see overdue tasks"),
            Feature::new("Progress Dashboard", "Overview of task status across projects"),
        ],
    )
}

fn storefront() -> GenerationResult {
    GenerationResult::from_parts(
        "ShopEase",
        vec![
            Entity::new("Customer", &["id", "name", "email", "address"]),
            Entity::new("Product", &["id", "name", "description", "price", "stock", "category"]),
            Entity::new("Order", &["id", "customerId", "items", "total", "status", "createdAt"]),
        ],
        vec![
            UserRole::new("Admin", "Manages products, inventory and orders"),
            UserRole::new("Customer", "Browses products and places orders"),
        ],
        vec![
            Feature::new("Product Catalog", "Browse and search products by category"),
            Feature::new("Shopping Cart", "Add, remove and update items before checkout"),
            Feature::new("Checkout", "Pay for orders and receive confirmation"),
            Feature::new("Order Tracking", "Follow the status of placed orders"),
        ],
    )
}

fn generic() -> GenerationResult {
    GenerationResult::from_parts(
        "MyApp",
        vec![
            Entity::new("User", &["id", "name", "email"]),
            Entity::new("Item", &["id", "title", "description", "createdAt"]),
        ],
        vec![
            UserRole::new("Admin", "Manages the application and its users"),
            UserRole::new("User", "Uses the core features of the application"),
        ],
        vec![
            Feature::new("Authentication", "Sign up, log in and log out"),
            Feature::new("Item Management", "Create, view, edit and delete items"),
            Feature::new("Search", "Find items by keyword"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::validate_response;

    #[test]
    fn test_task_keywords() {
        assert_eq!(template_result("I want to build a task management app").app_name, "TaskFlow");
        assert_eq!(template_result("A TODO list").app_name, "TaskFlow");
    }

    #[test]
    fn test_store_keywords() {
        assert_eq!(template_result("An online shop for shoes").app_name, "ShopEase");
        assert_eq!(template_result("E-commerce site").app_name, "ShopEase");
        assert_eq!(template_result("ecommerce for books").app_name, "ShopEase");
    }

    #[test]
    fn test_task_beats_store() {
        assert_eq!(template_result("task list for my store staff").app_name, "TaskFlow");
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(template_result("A recipe sharing platform").app_name, "MyApp");
    }

    #[test]
    fn test_deterministic() {
        let text = "a store for plants";
        assert_eq!(template_result(text), template_result(text));
    }

    #[test]
    fn test_templates_pass_response_validation() {
        for result in [task_manager(), storefront(), generic()] {
            let value = serde_json::to_value(&result).unwrap();
            assert!(validate_response(value).is_ok());
        }
    }
}
