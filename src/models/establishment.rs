use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// 门店表 (faturas_empresa)
#[derive(Debug, Clone, FromRow)]
pub struct EstablishmentRow {
    pub nif: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager: Option<String>,
    pub branches: Option<String>, // filiais::text, JSON 数组
}

/// 门店 (返回给前端)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub nif: String,
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "morada")]
    pub address: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "responsavel")]
    pub manager: Option<String>,
    #[serde(rename = "filiais")]
    pub branches: Vec<Branch>,
}

/// 分店
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "filial_id")]
    pub id: String,
    #[serde(rename = "filial_numero")]
    pub number: String,
    #[serde(rename = "filial_nome")]
    pub name: String,
}

impl From<EstablishmentRow> for Establishment {
    fn from(row: EstablishmentRow) -> Self {
        let branches = row.branches.as_deref().map(parse_branches).unwrap_or_default();
        Self {
            nif: row.nif,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            manager: row.manager,
            branches,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 解析 filiais 列: 分店编号数组, 或 {id, numero, nome} 对象数组
pub fn parse_branches(raw: &str) -> Vec<Branch> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        if !raw.trim().is_empty() {
            tracing::warn!("filiais 字段无法解析: {}", raw);
        }
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(obj) => {
                let id = obj.get("id").and_then(scalar_to_string);
                let number = obj.get("numero").and_then(scalar_to_string);
                let id = id.clone().or_else(|| number.clone())?;
                let number = number.unwrap_or_else(|| id.clone());
                let name = obj
                    .get("nome")
                    .and_then(scalar_to_string)
                    .unwrap_or_else(|| format!("Filial {}", number));
                Some(Branch { id, number, name })
            }
            other => scalar_to_string(other).map(|number| Branch {
                id: number.clone(),
                name: format!("Filial {}", number),
                number,
            }),
        })
        .collect()
}

/// 解析 usuarios.nif: JSON 数组或单个 NIF
pub fn parse_nif_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries.iter().filter_map(scalar_to_string).collect(),
        Ok(value @ (Value::String(_) | Value::Number(_))) => {
            scalar_to_string(&value).into_iter().collect()
        }
        _ => {
            let nif = raw.trim();
            if nif.is_empty() {
                Vec::new()
            } else {
                vec![nif.to_string()]
            }
        }
    }
}
