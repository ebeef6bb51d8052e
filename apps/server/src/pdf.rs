//! PDF rendering for tickets and sales reports.
//!
//! Built-in Helvetica only, so documents render without font files on
//! disk. Layouts are deliberately plain: an 80mm thermal-style ticket
//! and an A4 per-day sales table. Rendering is CPU-bound; handlers call
//! these through `spawn_blocking`.

use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
};

use almacen_core::{tz, Money, SaleStatus};
use almacen_db::{DayTotal, SaleWithItems};

use crate::error::{ApiError, ApiResult};

/// 80mm thermal roll width.
const TICKET_WIDTH_MM: f32 = 80.0;
/// A4 portrait.
const REPORT_WIDTH_MM: f32 = 210.0;
const REPORT_HEIGHT_MM: f32 = 297.0;

fn pdf_err(e: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(format!("pdf rendering failed: {e}"))
}

fn money(centavos: i64) -> String {
    Money::from_centavos(centavos).to_string()
}

/// Rough right-alignment for proportional Helvetica at small sizes.
fn right_x(right_edge: f32, text: &str, size: f32) -> f32 {
    right_edge - text.len() as f32 * size * 0.20
}

fn hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32) {
    let line = Line::from_iter(vec![
        (Point::new(Mm(x1), Mm(y)), false),
        (Point::new(Mm(x2), Mm(y)), false),
    ]);
    layer.add_line(line);
}

// =============================================================================
// Ticket
// =============================================================================

/// Renders one sale as an 80mm receipt.
///
/// The page height is computed from the item count so the ticket never
/// overflows onto a second page.
pub fn render_ticket(
    sale: &SaleWithItems,
    store_name: &str,
    sold_by: &str,
    customer_name: Option<&str>,
) -> ApiResult<Vec<u8>> {
    let item_rows = sale.items.len() as f32;
    let height = (70.0 + item_rows * 9.0).max(110.0);

    let (doc, page, layer) = PdfDocument::new(
        format!("Ticket {}", sale.sale.receipt_number),
        Mm(TICKET_WIDTH_MM),
        Mm(height),
        "Layer 1",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let layer = doc.get_page(page).get_layer(layer);

    let margin: f32 = 5.0;
    let right: f32 = TICKET_WIDTH_MM - margin;
    let mut y = height - 10.0;

    let text = |l: &PdfLayerReference, f: &IndirectFontRef, x: f32, y: f32, size: f32, s: &str| {
        l.use_text(s, size, Mm(x), Mm(y), f);
    };

    // --- Header ---
    text(&layer, &bold, margin, y, 12.0, store_name);
    y -= 6.0;
    text(
        &layer,
        &font,
        margin,
        y,
        9.0,
        &format!("Ticket {}", sale.sale.receipt_number),
    );
    y -= 5.0;
    text(
        &layer,
        &font,
        margin,
        y,
        8.0,
        &tz::format_local(sale.sale.created_at),
    );
    y -= 5.0;
    text(&layer, &font, margin, y, 8.0, &format!("Atendido por: {sold_by}"));
    if let Some(name) = customer_name {
        y -= 5.0;
        text(&layer, &font, margin, y, 8.0, &format!("Cliente: {name}"));
    }

    if sale.sale.status == SaleStatus::Cancelled {
        y -= 6.0;
        text(&layer, &bold, margin, y, 11.0, "*** ANULADO ***");
    }

    y -= 4.0;
    hline(&layer, margin, right, y);
    y -= 6.0;

    // --- Items: name line, then qty x unit price and line total ---
    for item in &sale.items {
        let name = match &item.presentation_snapshot {
            Some(p) => format!("{} ({})", item.name_snapshot, p),
            None => item.name_snapshot.clone(),
        };
        text(&layer, &font, margin, y, 8.0, &name);
        y -= 4.0;

        let qty_price = format!("{} x {}", item.quantity, money(item.unit_price_centavos));
        text(&layer, &font, margin + 2.0, y, 8.0, &qty_price);

        let total = money(item.line_total_centavos);
        text(&layer, &font, right_x(right, &total, 8.0), y, 8.0, &total);
        y -= 5.0;
    }

    hline(&layer, margin, right, y);
    y -= 6.0;

    // --- Totals ---
    let subtotal = money(sale.sale.subtotal_centavos);
    text(&layer, &font, margin, y, 9.0, "Subtotal");
    text(&layer, &font, right_x(right, &subtotal, 9.0), y, 9.0, &subtotal);
    y -= 5.0;

    if sale.sale.discount_centavos > 0 {
        let discount = format!("-{}", money(sale.sale.discount_centavos));
        text(&layer, &font, margin, y, 9.0, "Descuento");
        text(&layer, &font, right_x(right, &discount, 9.0), y, 9.0, &discount);
        y -= 5.0;
    }

    let total = money(sale.sale.total_centavos);
    text(&layer, &bold, margin, y, 11.0, "TOTAL");
    text(&layer, &bold, right_x(right, &total, 11.0), y, 11.0, &total);
    y -= 6.0;

    text(
        &layer,
        &font,
        margin,
        y,
        8.0,
        &format!("Pago: {}", sale.sale.payment_method.as_str()),
    );
    y -= 8.0;

    // --- Footer ---
    text(&layer, &font, margin, y, 8.0, "Gracias por su compra");
    y -= 4.0;
    text(&layer, &font, margin, y, 7.0, "Documento no fiscal");

    doc.save_to_bytes().map_err(pdf_err)
}

// =============================================================================
// Sales report
// =============================================================================

/// Renders the per-day sales table for an inclusive date range.
pub fn render_sales_report(
    rows: &[DayTotal],
    from: NaiveDate,
    to: NaiveDate,
    store_name: &str,
) -> ApiResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Reporte de ventas",
        Mm(REPORT_WIDTH_MM),
        Mm(REPORT_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut layer = doc.get_page(page).get_layer(layer);

    let margin: f32 = 15.0;
    let right: f32 = REPORT_WIDTH_MM - margin;
    let mut y: f32 = REPORT_HEIGHT_MM - 20.0;

    let text = |l: &PdfLayerReference, f: &IndirectFontRef, x: f32, y: f32, size: f32, s: &str| {
        l.use_text(s, size, Mm(x), Mm(y), f);
    };

    // --- Title ---
    text(&layer, &bold, margin, y, 16.0, store_name);
    y -= 8.0;
    text(
        &layer,
        &font,
        margin,
        y,
        11.0,
        &format!(
            "Ventas por día: {} al {}",
            from.format("%d/%m/%Y"),
            to.format("%d/%m/%Y")
        ),
    );
    y -= 10.0;

    // --- Table header ---
    let col_date = margin;
    let col_tickets = margin + 60.0;
    let col_total = right;

    text(&layer, &bold, col_date, y, 10.0, "Fecha");
    text(&layer, &bold, col_tickets, y, 10.0, "Tickets");
    text(&layer, &bold, right_x(col_total, "Total", 10.0), y, 10.0, "Total");
    y -= 3.0;
    hline(&layer, margin, right, y);
    y -= 6.0;

    // --- Rows ---
    let mut total_tickets: i64 = 0;
    let mut total_centavos: i64 = 0;

    for row in rows {
        if y < 25.0 {
            let (next_page, next_layer) =
                doc.add_page(Mm(REPORT_WIDTH_MM), Mm(REPORT_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = REPORT_HEIGHT_MM - 20.0;
        }

        text(
            &layer,
            &font,
            col_date,
            y,
            10.0,
            &row.date.format("%d/%m/%Y").to_string(),
        );
        text(&layer, &font, col_tickets, y, 10.0, &row.tickets.to_string());
        let amount = money(row.total_centavos);
        text(&layer, &font, right_x(col_total, &amount, 10.0), y, 10.0, &amount);
        y -= 6.0;

        total_tickets += row.tickets;
        total_centavos += row.total_centavos;
    }

    if rows.is_empty() {
        text(&layer, &font, col_date, y, 10.0, "Sin ventas en el rango");
        y -= 6.0;
    }

    // --- Totals ---
    y -= 2.0;
    hline(&layer, margin, right, y);
    y -= 6.0;
    text(&layer, &bold, col_date, y, 10.0, "Total");
    text(&layer, &bold, col_tickets, y, 10.0, &total_tickets.to_string());
    let grand = money(total_centavos);
    text(&layer, &bold, right_x(col_total, &grand, 10.0), y, 10.0, &grand);

    // --- Footer ---
    text(
        &layer,
        &font,
        margin,
        12.0,
        8.0,
        &format!("Emitido: {}", tz::format_local(chrono::Utc::now())),
    );

    doc.save_to_bytes().map_err(pdf_err)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use almacen_core::{PaymentMethod, Sale, SaleItem, SaleStatus};

    fn sample_sale(items: usize) -> SaleWithItems {
        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        let items: Vec<SaleItem> = (0..items)
            .map(|i| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: Uuid::new_v4().to_string(),
                presentation_id: None,
                sku_snapshot: format!("SKU-{i}"),
                name_snapshot: format!("Producto {i}"),
                presentation_snapshot: None,
                units_per_presentation: 1,
                quantity: 2,
                unit_price_centavos: 150000,
                line_total_centavos: 300000,
            })
            .collect();

        let subtotal: i64 = items.iter().map(|i| i.line_total_centavos).sum();

        SaleWithItems {
            sale: Sale {
                id: sale_id,
                ticket_number: 42,
                receipt_number: "0001-00000042".to_string(),
                customer_id: None,
                user_id: Uuid::new_v4().to_string(),
                payment_method: PaymentMethod::Efectivo,
                subtotal_centavos: subtotal,
                discount_centavos: 0,
                total_centavos: subtotal,
                status: SaleStatus::Completed,
                business_date: tz::business_date(now),
                cancel_reason: None,
                cancelled_at: None,
                cancelled_by: None,
                created_at: now,
            },
            items,
        }
    }

    #[test]
    fn test_ticket_renders_pdf_bytes() {
        let sale = sample_sale(3);
        let bytes = render_ticket(&sale, "Almacén Don Luis", "cajera", Some("Juan Pérez"))
            .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_large_ticket_gets_taller_page() {
        let small = render_ticket(&sample_sale(1), "Almacén", "cajera", None).unwrap();
        let large = render_ticket(&sample_sale(60), "Almacén", "cajera", None).unwrap();

        assert!(large.len() > small.len());
    }

    #[test]
    fn test_report_renders_with_rows_and_empty() {
        let rows = vec![
            DayTotal {
                date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                tickets: 12,
                total_centavos: 4_500_000,
            },
            DayTotal {
                date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
                tickets: 9,
                total_centavos: 3_100_000,
            },
        ];
        let from = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();

        let bytes = render_sales_report(&rows, from, to, "Almacén Don Luis").unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let empty = render_sales_report(&[], from, to, "Almacén Don Luis").unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }

    #[test]
    fn test_report_overflows_to_second_page() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let rows: Vec<DayTotal> = (0..80)
            .map(|i| DayTotal {
                date: from + chrono::Duration::days(i),
                tickets: 5,
                total_centavos: 1_000_000,
            })
            .collect();
        let to = from + chrono::Duration::days(79);

        let bytes = render_sales_report(&rows, from, to, "Almacén").unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        // More /Page objects than a single-page report.
        let one_page = render_sales_report(&rows[..1], from, to, "Almacén").unwrap();
        let pages = |b: &[u8]| String::from_utf8_lossy(b).matches("/Page").count();
        assert!(pages(&bytes) > pages(&one_page));
    }
}
