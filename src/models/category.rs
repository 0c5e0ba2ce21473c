// src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// Categoria ou subcategoria (quando tem parent_id). Só um nível de profundidade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[schema(example = "Bolos")]
    pub name: String,
    #[schema(example = "https://cdn.exemplo.com/banners/bolos.jpg")]
    pub banner_url: Option<String>,
    #[schema(example = 1)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// Monta a árvore a partir da lista plana (já ordenada por posição/nome).
/// Subcategorias cujo pai não está na lista são descartadas.
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (parents, children): (Vec<Category>, Vec<Category>) =
        categories.into_iter().partition(|c| c.parent_id.is_none());

    parents
        .into_iter()
        .map(|category| {
            let subcategories = children
                .iter()
                .filter(|c| c.parent_id == Some(category.id))
                .cloned()
                .collect();
            CategoryNode { category, subcategories }
        })
        .collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Bolos de Festa")]
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub banner_url: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            parent_id,
            name: name.into(),
            banner_url: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn nests_subcategories_under_their_parent() {
        let bolos = category("Bolos", None);
        let doces = category("Doces", None);
        let festa = category("Festa", Some(bolos.id));
        let caseiro = category("Caseiro", Some(bolos.id));
        let orfa = category("Órfã", Some(Uuid::new_v4()));

        let tree = build_category_tree(vec![bolos.clone(), festa, doces, caseiro, orfa]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name, "Bolos");
        let names: Vec<_> = tree[0].subcategories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Festa", "Caseiro"]);
        assert!(tree[1].subcategories.is_empty());
    }
}
