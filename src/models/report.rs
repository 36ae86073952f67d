use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::InvoiceSummary;

/// 单个时段的统计 (总额, 单数, 件数, 客单价)
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStats {
    pub total: BigDecimal,
    pub invoice_count: i64,
    pub item_count: i64,
    pub average_ticket: BigDecimal,
}

impl Default for PeriodStats {
    fn default() -> Self {
        Self {
            total: BigDecimal::zero(),
            invoice_count: 0,
            item_count: 0,
            average_ticket: BigDecimal::zero(),
        }
    }
}

/// 每小时对比行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    #[serde(rename = "hora")]
    pub label: String,
    #[serde(rename = "atual")]
    pub current: f64,
    #[serde(rename = "anterior")]
    pub previous: f64,
}

/// 本期 vs 上期的变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    #[serde(rename = "valor")]
    pub current: f64,
    #[serde(rename = "ontem")]
    pub prior: f64,
    #[serde(rename = "variacao")]
    pub formatted: String,
    #[serde(rename = "cor")]
    pub color: String,
    #[serde(skip)]
    pub delta: f64,
    #[serde(skip)]
    pub percent: f64,
}

/// /api/stats/resumo 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub periodo: String,
    pub total_vendas: VarianceResult,
    pub numero_recibos: VarianceResult,
    pub itens_vendidos: VarianceResult,
    pub ticket_medio: VarianceResult,
    pub comparativo_por_hora: Vec<HourlySlot>,
}

/// 商品排行行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    #[serde(rename = "produto")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: i64,
    #[serde(rename = "montante")]
    pub amount: f64,
    #[serde(rename = "porcentagem_montante")]
    pub share: f64,
}

/// /api/produtos 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProducts {
    pub data_inicio: String,
    pub data_fim: String,
    pub periodo: String,
    pub total_itens: i64,
    pub total_montante: f64,
    pub itens: Vec<ProductEntry>,
}

/// 发票列表行 (前端格式)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceListEntry {
    pub id: i64,
    pub numero_fatura: String,
    pub data: String,
    pub hora: Option<String>,
    pub total: f64,
    pub nif_cliente: Option<String>,
    pub filial: Option<String>,
}

impl From<&InvoiceSummary> for InvoiceListEntry {
    fn from(s: &InvoiceSummary) -> Self {
        Self {
            id: s.id,
            numero_fatura: s.number.clone(),
            data: s.date.format("%Y-%m-%d").to_string(),
            hora: s.time.clone(),
            total: s.total.to_f64().unwrap_or(0.0),
            nif_cliente: s.customer_tax_id.clone(),
            filial: s.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub nome: String,
    pub codigo: u8,
    pub inicio: String,
    pub fim: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceListStats {
    pub total_faturas: i64,
    pub total_montante: f64,
    pub ticket_medio: f64,
}

/// /api/faturas 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub faturas: Vec<InvoiceListEntry>,
    pub periodo: PeriodInfo,
    pub estatisticas: InvoiceListStats,
}

/// 热力图单元: 某小时 × 星期几
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub hora: String,
    pub hora_num: usize,
    pub dia_semana: String,
    pub dia_num: usize,
    pub volume: f64,
    pub quantidade_faturas: i64,
    pub ticket_medio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapStats {
    pub total_volume: f64,
    pub total_faturas: i64,
    pub periodo: String,
    pub data_inicio: String,
    pub data_fim: String,
    pub quantidade_celulas_com_dados: usize,
    pub variacao_volume: VarianceResult,
    pub variacao_faturas: VarianceResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapPriorStats {
    pub total_volume: f64,
    pub total_faturas: i64,
    pub data_inicio: String,
    pub data_fim: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePeak {
    pub hora: String,
    pub dia: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountPeak {
    pub hora: String,
    pub dia: String,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapPeaks {
    pub maior_volume: Option<VolumePeak>,
    pub maior_quantidade: Option<CountPeak>,
}

/// /api/heatmap 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heatmap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub periodo: String,
    pub dados: Vec<HeatmapCell>,
    pub estatisticas: HeatmapStats,
    pub periodo_anterior: HeatmapPriorStats,
    pub picos: HeatmapPeaks,
    pub nomes_dias: Vec<String>,
    pub horas_disponiveis: Vec<String>,
}
