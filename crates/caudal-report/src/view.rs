//! Dashboard view assembly: the table model and the six chart payloads.

use crate::aggregate::{aggregate, PeriodBucket};
use crate::decimal_to_f64;
use crate::filter::{apply_filters, FilterConfig};
use crate::kpi::{balance_series, category_totals, kind_totals, Kpis};
use caudal_core::{
    format_date, format_date_short, format_eur, format_percent, Granularity, NaiveDate,
    Transaction, TxnKind, GRAND_TOTAL_LABEL,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// One row of the transaction table, formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    /// Transaction date as `DD/MM/YYYY`.
    pub date: String,
    /// Row kind, for styling.
    pub kind: TxnKind,
    /// Spanish badge text, `Ingreso` or `Gasto`.
    pub badge: &'static str,
    /// Category label.
    pub category: String,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Formatted unsigned amount.
    pub amount: String,
}

/// The transaction-table model: caption plus rows, most recent date first.
#[derive(Debug, Clone, Serialize)]
pub struct TableModel {
    /// Caption such as `Detalle Mensual del 2024 (Comida)`.
    pub caption: String,
    /// Formatted rows, date descending; same-date rows keep filtered order.
    pub rows: Vec<TableRow>,
}

/// A named numeric series within a chart.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    /// Legend name; `None` for single-series pie and donut datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    /// Points aligned index-by-index with the chart labels.
    pub values: Vec<f64>,
}

impl Series {
    fn named(name: &'static str, values: Vec<f64>) -> Self {
        Self {
            name: Some(name),
            values,
        }
    }

    fn unnamed(values: Vec<f64>) -> Self {
        Self { name: None, values }
    }
}

/// One chart payload: title, axis labels and aligned series.
///
/// A chart with no labels is the "no data" state; the title survives so a
/// consumer can still render the empty frame.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    /// Chart title, as shown above the plot.
    pub title: &'static str,
    /// Axis or slice labels.
    pub labels: Vec<String>,
    /// One entry per dataset.
    pub series: Vec<Series>,
}

impl Chart {
    fn empty(title: &'static str) -> Self {
        Self {
            title,
            labels: Vec::new(),
            series: Vec::new(),
        }
    }

    /// True when there is nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The six dashboard charts.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    /// Income and expense bars per period, or one grand-total bar pair.
    pub income_vs_expense: Chart,
    /// Income versus expense donut over the whole filtered sequence.
    pub income_expense_split: Chart,
    /// Net cashflow line per period, or per year when unbucketed.
    pub net_trend: Chart,
    /// Expense totals by category, amount descending.
    pub expense_by_category: Chart,
    /// Income totals by category, amount descending.
    pub income_by_category: Chart,
    /// Running balance, one point per distinct day.
    pub cumulative_balance: Chart,
}

impl ChartSet {
    fn build(filtered: &[Transaction], buckets: &[PeriodBucket], granularity: Granularity) -> Self {
        Self {
            income_vs_expense: income_vs_expense_chart(filtered, buckets, granularity),
            income_expense_split: income_expense_split_chart(filtered),
            net_trend: net_trend_chart(filtered, buckets, granularity),
            expense_by_category: category_chart(filtered, TxnKind::Expense),
            income_by_category: category_chart(filtered, TxnKind::Income),
            cumulative_balance: cumulative_balance_chart(filtered),
        }
    }
}

/// One bucket of the serialized view: sums without member records.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    /// Canonical period key.
    pub key: String,
    /// Human period label.
    pub label: String,
    /// First day of the period.
    pub start: NaiveDate,
    /// Summed income.
    pub income: Decimal,
    /// Summed expense.
    pub expense: Decimal,
    /// Income minus expense.
    pub net: Decimal,
    /// Member transaction count.
    pub count: usize,
}

impl From<&PeriodBucket> for BucketSummary {
    fn from(bucket: &PeriodBucket) -> Self {
        Self {
            key: bucket.key.clone(),
            label: bucket.label.clone(),
            start: bucket.start,
            income: bucket.income,
            expense: bucket.expense,
            net: bucket.net(),
            count: bucket.count(),
        }
    }
}

/// [`Kpis`] together with their formatted display strings.
#[derive(Debug, Clone, Serialize)]
pub struct KpiPanel {
    /// The raw figures.
    #[serde(flatten)]
    pub figures: Kpis,
    /// Formatted display income.
    pub income_display: String,
    /// Formatted display expense.
    pub expense_display: String,
    /// Formatted net cashflow.
    pub net_display: String,
    /// Formatted net margin.
    pub margin_display: String,
    /// Formatted ending balance.
    pub balance_display: String,
}

impl KpiPanel {
    /// Attach display strings to computed figures.
    #[must_use]
    pub fn new(figures: Kpis) -> Self {
        Self {
            income_display: format_eur(figures.income),
            expense_display: format_eur(figures.expense),
            net_display: format_eur(figures.net_cashflow),
            margin_display: format_percent(figures.net_margin_pct),
            balance_display: format_eur(figures.ending_balance),
            figures,
        }
    }
}

/// Everything a dashboard renders for one (filter, granularity) pair,
/// already ordered and formatted.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// The granularity the view was built for.
    pub granularity: Granularity,
    /// Headline figures with display strings.
    pub kpis: KpiPanel,
    /// Aggregated period summaries; empty when unbucketed.
    pub buckets: Vec<BucketSummary>,
    /// The transaction table.
    pub table: TableModel,
    /// The chart payloads.
    pub charts: ChartSet,
}

/// Run the whole pipeline for one (filter, granularity) pair.
///
/// Pure: equal inputs produce equal views, and nothing survives between
/// invocations. An empty filtered sequence yields a fully formed view with
/// neutral KPIs, an `N/A` period label and empty rows and series.
#[must_use]
pub fn build_view(
    transactions: &[Transaction],
    config: &FilterConfig,
    granularity: Granularity,
) -> DashboardView {
    let filtered = apply_filters(transactions, config);
    let buckets = aggregate(&filtered, granularity);
    let kpis = Kpis::compute(&filtered, &buckets, granularity);

    DashboardView {
        granularity,
        kpis: KpiPanel::new(kpis),
        table: table_model(&filtered, config, granularity),
        charts: ChartSet::build(&filtered, &buckets, granularity),
        buckets: buckets.iter().map(BucketSummary::from).collect(),
    }
}

fn table_model(
    filtered: &[Transaction],
    config: &FilterConfig,
    granularity: Granularity,
) -> TableModel {
    let mut ordered: Vec<&Transaction> = filtered.iter().collect();
    // Stable, so same-date rows keep filtered order
    ordered.sort_by_key(|txn| Reverse(txn.date));

    let rows = ordered
        .into_iter()
        .map(|txn| TableRow {
            date: format_date(txn.date),
            kind: txn.kind,
            badge: txn.kind.badge_label(),
            category: txn.category.clone(),
            description: txn.description.clone(),
            amount: format_eur(txn.amount),
        })
        .collect();

    TableModel {
        caption: table_caption(config, granularity),
        rows,
    }
}

/// Caption above the table, reflecting granularity and active filters.
fn table_caption(config: &FilterConfig, granularity: Granularity) -> String {
    let mut caption = format!("Detalle {}", granularity.caption_word());
    if let Some(year) = config.year {
        caption.push_str(&format!(" del {year}"));
    }
    if let Some(category) = &config.category {
        caption.push_str(&format!(" ({category})"));
    }
    caption
}

fn income_vs_expense_chart(
    filtered: &[Transaction],
    buckets: &[PeriodBucket],
    granularity: Granularity,
) -> Chart {
    if granularity.is_bucketed() {
        if buckets.is_empty() {
            return Chart::empty("Ingresos vs. Gastos por Período");
        }
        Chart {
            title: "Ingresos vs. Gastos por Período",
            labels: buckets.iter().map(|b| b.label.clone()).collect(),
            series: vec![
                Series::named(
                    "Ingresos",
                    buckets.iter().map(|b| decimal_to_f64(b.income)).collect(),
                ),
                Series::named(
                    "Gastos",
                    buckets.iter().map(|b| decimal_to_f64(b.expense)).collect(),
                ),
            ],
        }
    } else {
        if filtered.is_empty() {
            return Chart::empty("Ingresos vs. Gastos (Total General)");
        }
        let (income, expense) = kind_totals(filtered);
        Chart {
            title: "Ingresos vs. Gastos (Total General)",
            labels: vec![GRAND_TOTAL_LABEL.to_string()],
            series: vec![
                Series::named("Ingresos", vec![decimal_to_f64(income)]),
                Series::named("Gastos", vec![decimal_to_f64(expense)]),
            ],
        }
    }
}

fn income_expense_split_chart(filtered: &[Transaction]) -> Chart {
    let (income, expense) = kind_totals(filtered);
    if income <= Decimal::ZERO && expense <= Decimal::ZERO {
        return Chart::empty("Distribución Ingresos/Gastos (Total Filtrado)");
    }
    Chart {
        title: "Distribución Ingresos/Gastos (Total Filtrado)",
        labels: vec!["Ingresos Totales".to_string(), "Gastos Totales".to_string()],
        series: vec![Series::unnamed(vec![
            decimal_to_f64(income),
            decimal_to_f64(expense),
        ])],
    }
}

fn net_trend_chart(
    filtered: &[Transaction],
    buckets: &[PeriodBucket],
    granularity: Granularity,
) -> Chart {
    if granularity.is_bucketed() {
        if buckets.is_empty() {
            return Chart::empty("Tendencia del Flujo Neto de Caja (por Período)");
        }
        Chart {
            title: "Tendencia del Flujo Neto de Caja (por Período)",
            labels: buckets.iter().map(|b| b.label.clone()).collect(),
            series: vec![Series::named(
                "Flujo Neto de Caja",
                buckets.iter().map(|b| decimal_to_f64(b.net())).collect(),
            )],
        }
    } else {
        // Yearly nets over the filtered sequence, ascending years
        let mut yearly: BTreeMap<i32, Decimal> = BTreeMap::new();
        for txn in filtered {
            *yearly.entry(txn.year()).or_insert(Decimal::ZERO) += txn.signed_amount();
        }
        if yearly.is_empty() {
            return Chart::empty("Tendencia Anual Flujo Neto (Vista General)");
        }
        Chart {
            title: "Tendencia Anual Flujo Neto (Vista General)",
            labels: yearly.keys().map(ToString::to_string).collect(),
            series: vec![Series::named(
                "Flujo Neto de Caja",
                yearly.values().map(|net| decimal_to_f64(*net)).collect(),
            )],
        }
    }
}

fn category_chart(filtered: &[Transaction], kind: TxnKind) -> Chart {
    let title = match kind {
        TxnKind::Expense => "Distribución de Gastos por Categoría (Total Filtrado)",
        TxnKind::Income => "Distribución de Ingresos por Categoría (Total Filtrado)",
    };

    let mut totals = category_totals(filtered, kind);
    let total: Decimal = totals.iter().map(|(_, amount)| *amount).sum();
    if total <= Decimal::ZERO {
        return Chart::empty(title);
    }

    // Stable, so equal totals keep first-seen order
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    Chart {
        title,
        labels: totals.iter().map(|(category, _)| category.clone()).collect(),
        series: vec![Series::unnamed(
            totals.iter().map(|(_, amount)| decimal_to_f64(*amount)).collect(),
        )],
    }
}

fn cumulative_balance_chart(filtered: &[Transaction]) -> Chart {
    let series = balance_series(filtered);
    if series.is_empty() {
        return Chart::empty("Evolución del Saldo Acumulado");
    }
    Chart {
        title: "Evolución del Saldo Acumulado",
        labels: series
            .iter()
            .map(|(date, _)| format_date_short(*date))
            .collect(),
        series: vec![Series::named(
            "Saldo Acumulado",
            series.iter().map(|(_, balance)| decimal_to_f64(*balance)).collect(),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(
        date: (i32, u32, u32),
        amount: Decimal,
        kind: TxnKind,
        category: &str,
        description: &str,
    ) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount,
            kind,
            category,
        )
        .with_description(description)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn((2024, 1, 5), dec!(100), TxnKind::Income, "Salary", "Nómina"),
            txn((2024, 1, 10), dec!(40), TxnKind::Expense, "Food", "Supermercado"),
            txn((2024, 2, 1), dec!(60), TxnKind::Expense, "Food", "Cena"),
        ]
    }

    #[test]
    fn test_table_rows_are_date_descending_and_formatted() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let dates: Vec<&str> = view.table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["01/02/2024", "10/01/2024", "05/01/2024"]);

        let first = &view.table.rows[0];
        assert_eq!(first.badge, "Gasto");
        assert_eq!(first.amount, "60,00 €");
        assert_eq!(first.category, "Food");
        assert_eq!(first.description, "Cena");

        let last = &view.table.rows[2];
        assert_eq!(last.badge, "Ingreso");
        assert_eq!(last.amount, "100,00 €");
    }

    #[test]
    fn test_same_date_rows_keep_filtered_order() {
        let input = vec![
            txn((2024, 1, 5), dec!(1), TxnKind::Income, "A", "first"),
            txn((2024, 1, 5), dec!(2), TxnKind::Income, "A", "second"),
            txn((2024, 1, 1), dec!(3), TxnKind::Income, "A", "older"),
        ];
        let view = build_view(&input, &FilterConfig::default(), Granularity::Monthly);
        let order: Vec<&str> = view
            .table
            .rows
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(order, vec!["first", "second", "older"]);
    }

    #[test]
    fn test_captions_reflect_granularity_and_filters() {
        assert_eq!(
            table_caption(&FilterConfig::default(), Granularity::AllPeriods),
            "Detalle General"
        );
        assert_eq!(
            table_caption(&FilterConfig::new().with_year(2024), Granularity::Monthly),
            "Detalle Mensual del 2024"
        );
        assert_eq!(
            table_caption(
                &FilterConfig::new().with_year(2024).with_category("Comida"),
                Granularity::Quarterly,
            ),
            "Detalle Trimestral del 2024 (Comida)"
        );
        assert_eq!(
            table_caption(&FilterConfig::new().with_category("Ocio"), Granularity::Annual),
            "Detalle Anual (Ocio)"
        );
    }

    #[test]
    fn test_bar_chart_bucketed() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let chart = &view.charts.income_vs_expense;
        assert_eq!(chart.title, "Ingresos vs. Gastos por Período");
        assert_eq!(chart.labels, vec!["enero 2024", "febrero 2024"]);
        assert_eq!(chart.series[0].name, Some("Ingresos"));
        assert_eq!(chart.series[0].values, vec![100.0, 0.0]);
        assert_eq!(chart.series[1].name, Some("Gastos"));
        assert_eq!(chart.series[1].values, vec![40.0, 60.0]);
    }

    #[test]
    fn test_bar_chart_grand_total() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::AllPeriods);
        let chart = &view.charts.income_vs_expense;
        assert_eq!(chart.title, "Ingresos vs. Gastos (Total General)");
        assert_eq!(chart.labels, vec![GRAND_TOTAL_LABEL]);
        assert_eq!(chart.series[0].values, vec![100.0]);
        assert_eq!(chart.series[1].values, vec![100.0]);
    }

    #[test]
    fn test_donut_holds_grand_totals() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let chart = &view.charts.income_expense_split;
        assert_eq!(chart.title, "Distribución Ingresos/Gastos (Total Filtrado)");
        assert_eq!(chart.labels, vec!["Ingresos Totales", "Gastos Totales"]);
        assert_eq!(chart.series[0].name, None);
        assert_eq!(chart.series[0].values, vec![100.0, 100.0]);
    }

    #[test]
    fn test_donut_empty_when_both_totals_are_zero() {
        let input = vec![txn((2024, 1, 1), dec!(0), TxnKind::Income, "A", "")];
        let view = build_view(&input, &FilterConfig::default(), Granularity::Monthly);
        assert!(view.charts.income_expense_split.is_empty());
        assert_eq!(
            view.charts.income_expense_split.title,
            "Distribución Ingresos/Gastos (Total Filtrado)"
        );
    }

    #[test]
    fn test_trend_chart_bucketed_uses_bucket_nets() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let chart = &view.charts.net_trend;
        assert_eq!(chart.title, "Tendencia del Flujo Neto de Caja (por Período)");
        assert_eq!(chart.labels, vec!["enero 2024", "febrero 2024"]);
        assert_eq!(chart.series[0].name, Some("Flujo Neto de Caja"));
        assert_eq!(chart.series[0].values, vec![60.0, -60.0]);
    }

    #[test]
    fn test_trend_chart_unbucketed_aggregates_by_year() {
        let input = vec![
            txn((2023, 3, 1), dec!(50), TxnKind::Income, "A", ""),
            txn((2024, 1, 5), dec!(100), TxnKind::Income, "A", ""),
            txn((2024, 6, 1), dec!(30), TxnKind::Expense, "B", ""),
        ];
        let view = build_view(&input, &FilterConfig::default(), Granularity::AllPeriods);
        let chart = &view.charts.net_trend;
        assert_eq!(chart.title, "Tendencia Anual Flujo Neto (Vista General)");
        assert_eq!(chart.labels, vec!["2023", "2024"]);
        assert_eq!(chart.series[0].values, vec![50.0, 70.0]);
    }

    #[test]
    fn test_category_charts_sort_by_amount_descending() {
        let input = vec![
            txn((2024, 1, 1), dec!(10), TxnKind::Expense, "Ocio", ""),
            txn((2024, 1, 2), dec!(70), TxnKind::Expense, "Alquiler", ""),
            txn((2024, 1, 3), dec!(25), TxnKind::Expense, "Comida", ""),
            txn((2024, 1, 4), dec!(15), TxnKind::Expense, "Comida", ""),
        ];
        let view = build_view(&input, &FilterConfig::default(), Granularity::Monthly);
        let chart = &view.charts.expense_by_category;
        assert_eq!(
            chart.title,
            "Distribución de Gastos por Categoría (Total Filtrado)"
        );
        assert_eq!(chart.labels, vec!["Alquiler", "Comida", "Ocio"]);
        assert_eq!(chart.series[0].values, vec![70.0, 40.0, 10.0]);
        // No income at all, so the income pie is the empty frame
        assert!(view.charts.income_by_category.is_empty());
    }

    #[test]
    fn test_category_chart_tie_keeps_first_seen_order() {
        let input = vec![
            txn((2024, 1, 1), dec!(30), TxnKind::Expense, "Ocio", ""),
            txn((2024, 1, 2), dec!(30), TxnKind::Expense, "Comida", ""),
        ];
        let view = build_view(&input, &FilterConfig::default(), Granularity::Monthly);
        assert_eq!(
            view.charts.expense_by_category.labels,
            vec!["Ocio", "Comida"]
        );
    }

    #[test]
    fn test_cumulative_chart_labels_and_running_balance() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let chart = &view.charts.cumulative_balance;
        assert_eq!(chart.title, "Evolución del Saldo Acumulado");
        assert_eq!(chart.labels, vec!["05/01/24", "10/01/24", "01/02/24"]);
        assert_eq!(chart.series[0].name, Some("Saldo Acumulado"));
        assert_eq!(chart.series[0].values, vec![100.0, 60.0, 0.0]);
    }

    #[test]
    fn test_empty_filtered_sequence_yields_a_fully_formed_view() {
        let view = build_view(
            &sample(),
            &FilterConfig::new().with_year(1999),
            Granularity::Monthly,
        );
        assert_eq!(view.kpis.figures.period_label, "N/A");
        assert_eq!(view.kpis.income_display, "0,00 €");
        assert_eq!(view.kpis.margin_display, "0.0%");
        assert!(view.buckets.is_empty());
        assert!(view.table.rows.is_empty());
        assert_eq!(view.table.caption, "Detalle Mensual del 1999");
        assert!(view.charts.income_vs_expense.is_empty());
        assert!(view.charts.cumulative_balance.is_empty());
    }

    #[test]
    fn test_view_serializes_with_flat_kpis_and_granularity_string() {
        let view = build_view(&sample(), &FilterConfig::default(), Granularity::Monthly);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["granularity"], "monthly");
        // Flattened figures sit next to the display strings
        assert_eq!(json["kpis"]["period_label"], "febrero 2024");
        assert_eq!(json["kpis"]["net_display"], "-60,00 €");
        assert_eq!(json["kpis"]["margin_status"], "risk");
        assert_eq!(json["buckets"][0]["key"], "2024-01");
        assert_eq!(json["buckets"][0]["count"], 2);
        assert_eq!(json["table"]["rows"][0]["badge"], "Gasto");
        assert_eq!(json["charts"]["income_vs_expense"]["series"][0]["name"], "Ingresos");
        // Unnamed pie series omit the name field entirely
        assert!(json["charts"]["income_expense_split"]["series"][0]
            .get("name")
            .is_none());
    }
}
