pub mod establishment;
pub mod invoice;
pub mod report;

pub use establishment::{parse_branches, parse_nif_list, Branch, Establishment, EstablishmentRow};
pub use invoice::{Invoice, InvoiceDocument, InvoiceLineRow, InvoiceSummary, LineItem};
pub use report::{
    CountPeak, Heatmap, HeatmapCell, HeatmapPeaks, HeatmapPriorStats, HeatmapStats, HourlySlot,
    InvoiceList, InvoiceListEntry, InvoiceListStats, PeriodInfo, PeriodStats, ProductEntry,
    StatsSummary, TopProducts, VarianceResult, VolumePeak,
};
