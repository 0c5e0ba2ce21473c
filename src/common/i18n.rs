// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

pub const DEFAULT_LANG: &str = "pt";

type Catalog = HashMap<String, String>;

// Catálogos embutidos no binário
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, Catalog>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let catalog: Catalog = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), catalog);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Busca a mensagem no idioma pedido, cai para o português e, por último, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn translate_with(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.translate(lang, key), |msg, (name, value)| {
                msg.replace(&format!("{{{}}}", name), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_english_key_exists_in_portuguese() {
        let store = I18nStore::load().unwrap();
        let pt = &store.catalogs["pt"];
        for key in store.catalogs["en"].keys() {
            assert!(pt.contains_key(key), "chave ausente em pt.json: {}", key);
        }
    }

    #[test]
    fn falls_back_to_portuguese_then_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("es", "errors.empty_order"), "O pedido precisa ter ao menos um item.");
        assert_eq!(store.translate("en", "nao.existe"), "nao.existe");
    }

    #[test]
    fn fills_named_parameters() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with(
            "pt",
            "errors.unknown_option",
            &[("product", "Bolo de Cenoura"), ("option", "Gigante")],
        );
        assert_eq!(msg, "A opção 'Gigante' não existe no produto 'Bolo de Cenoura'.");
    }
}
