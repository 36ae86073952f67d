use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::Datelike;

use crate::models::{
    CountPeak, Heatmap, HeatmapCell, HeatmapPeaks, HeatmapPriorStats, HeatmapStats, Invoice,
    VolumePeak,
};
use crate::service::hourly::{parse_hour, HOURS_PER_DAY};
use crate::service::period::{Bucket, Period, PeriodBounds};
use crate::service::variance::{compare, round_to};

pub const DAYS_PER_WEEK: usize = 7;

/// 星期一为 0
pub const WEEKDAY_NAMES: [&str; DAYS_PER_WEEK] =
    ["Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo"];

const EMPTY_MESSAGE: &str = "Nenhuma fatura encontrada para o período especificado";

#[derive(Debug, Clone, Default)]
struct Cell {
    volume: BigDecimal,
    count: i64,
}

/// 本期按 小时 × 星期 汇总, 上期只保留合计
#[derive(Debug, Clone)]
pub struct WeekdayHourGrid {
    cells: Vec<[Cell; DAYS_PER_WEEK]>,
    prior_volume: BigDecimal,
    prior_count: i64,
    /// 落在任一时段内的发票数
    pub classified: usize,
    /// 小时无法解析的发票数
    pub skipped: usize,
}

impl WeekdayHourGrid {
    fn current_totals(&self) -> (BigDecimal, i64) {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .fold((BigDecimal::zero(), 0), |(volume, count), cell| {
                (volume + &cell.volume, count + cell.count)
            })
    }

    /// 有数据的单元, 按小时再按星期排列
    pub fn cells(&self) -> Vec<HeatmapCell> {
        let mut out = Vec::new();
        for (hour, row) in self.cells.iter().enumerate() {
            for (day, cell) in row.iter().enumerate() {
                if cell.count == 0 {
                    continue;
                }
                let volume = cell.volume.to_f64().unwrap_or(0.0);
                out.push(HeatmapCell {
                    hora: format!("{:02}:00", hour),
                    hora_num: hour,
                    dia_semana: WEEKDAY_NAMES[day].to_string(),
                    dia_num: day,
                    volume: round_to(volume, 2),
                    quantidade_faturas: cell.count,
                    ticket_medio: round_to(volume / cell.count as f64, 2),
                });
            }
        }
        out
    }
}

pub fn group_by_weekday_hour(invoices: &[Invoice], bounds: &PeriodBounds) -> WeekdayHourGrid {
    let mut grid = WeekdayHourGrid {
        cells: vec![Default::default(); HOURS_PER_DAY],
        prior_volume: BigDecimal::zero(),
        prior_count: 0,
        classified: 0,
        skipped: 0,
    };

    for invoice in invoices {
        let Some(bucket) = bounds.classify(invoice.date) else {
            continue;
        };
        grid.classified += 1;

        let Some(hour) = invoice.time.as_deref().and_then(parse_hour) else {
            grid.skipped += 1;
            continue;
        };

        match bucket {
            Bucket::Current => {
                let day = invoice.date.weekday().num_days_from_monday() as usize;
                let cell = &mut grid.cells[hour][day];
                cell.volume += &invoice.total;
                cell.count += 1;
            }
            Bucket::Previous => {
                grid.prior_volume += &invoice.total;
                grid.prior_count += 1;
            }
        }
    }

    grid
}

/// 同值时取先出现的单元
fn peaks(cells: &[HeatmapCell]) -> HeatmapPeaks {
    let mut by_volume: Option<&HeatmapCell> = None;
    let mut by_count: Option<&HeatmapCell> = None;

    for cell in cells {
        if by_volume.map_or(true, |best| cell.volume > best.volume) {
            by_volume = Some(cell);
        }
        if by_count.map_or(true, |best| cell.quantidade_faturas > best.quantidade_faturas) {
            by_count = Some(cell);
        }
    }

    HeatmapPeaks {
        maior_volume: by_volume.map(|c| VolumePeak {
            hora: c.hora.clone(),
            dia: c.dia_semana.clone(),
            volume: c.volume,
        }),
        maior_quantidade: by_count.map(|c| CountPeak {
            hora: c.hora.clone(),
            dia: c.dia_semana.clone(),
            quantidade: c.quantidade_faturas,
        }),
    }
}

/// 组装 /api/heatmap 响应
pub fn build_heatmap(grid: &WeekdayHourGrid, period: Period, bounds: &PeriodBounds) -> Heatmap {
    let dados = grid.cells();
    let (volume, count) = grid.current_totals();
    let volume = volume.to_f64().unwrap_or(0.0);
    let prior_volume = grid.prior_volume.to_f64().unwrap_or(0.0);

    Heatmap {
        message: (grid.classified == 0).then(|| EMPTY_MESSAGE.to_string()),
        periodo: period.label().to_string(),
        estatisticas: HeatmapStats {
            total_volume: round_to(volume, 2),
            total_faturas: count,
            periodo: period.label().to_string(),
            data_inicio: bounds.current_start.format("%Y-%m-%d").to_string(),
            data_fim: bounds.current_end.format("%Y-%m-%d").to_string(),
            quantidade_celulas_com_dados: dados.len(),
            variacao_volume: compare(volume, prior_volume),
            variacao_faturas: compare(count as f64, grid.prior_count as f64),
        },
        periodo_anterior: HeatmapPriorStats {
            total_volume: round_to(prior_volume, 2),
            total_faturas: grid.prior_count,
            data_inicio: bounds.previous_start.format("%Y-%m-%d").to_string(),
            data_fim: bounds.previous_end.format("%Y-%m-%d").to_string(),
        },
        picos: peaks(&dados),
        dados,
        nomes_dias: WEEKDAY_NAMES.iter().map(|d| d.to_string()).collect(),
        horas_disponiveis: (0..HOURS_PER_DAY).map(|h| format!("{:02}:00", h)).collect(),
    }
}
