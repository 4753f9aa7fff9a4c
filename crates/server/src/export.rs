//! Fleet report export.
//!
//! Every format joins each vehicle with its mileage log. The spreadsheet formats
//! (XLSX and CSV) hold one row per log entry, or a single row marked
//! "No log entries" for vehicles without any. The PDF starts a new page for each
//! vehicle, shows its photo and numbers every page.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use printpdf::{
    Color, Greyscale, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use sea_orm::DatabaseConnection;
use time::Date;

use crate::entity::{mileage_log, vehicle};
use crate::error::ExportError;
use crate::store;

/// One vehicle with its log, newest event first.
#[derive(Debug, Clone)]
pub struct VehicleReport {
    pub vehicle: vehicle::Model,
    pub logs: Vec<mileage_log::Model>,
}

const REPORT_HEADERS: [&str; 14] = [
    "Brand",
    "Model",
    "Plate",
    "Garage",
    "VIN",
    "Year",
    "Policy number",
    "Insurance until",
    "Inspection until",
    "Reminder e-mail",
    "Note",
    "Event date",
    "Mileage (km)",
    "Action",
];

const NO_LOG_ENTRIES: &str = "No log entries";

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Fleet report";
const XLSX_COLUMN_WIDTHS: [f64; 14] = [
    15.0, 15.0, 15.0, 15.0, 20.0, 10.0, 20.0, 15.0, 15.0, 25.0, 30.0, 15.0, 15.0, 30.0,
];

#[tracing::instrument(skip_all)]
pub async fn load_fleet_report(db: &DatabaseConnection) -> Result<Vec<VehicleReport>, ExportError> {
    let vehicles = store::all_vehicles(db).await?;
    let mut logs: HashMap<i32, Vec<mileage_log::Model>> = HashMap::new();
    for entry in store::all_mileage_entries(db).await? {
        logs.entry(entry.vehicle_id).or_default().push(entry);
    }
    Ok(vehicles
        .into_iter()
        .map(|vehicle| VehicleReport {
            logs: logs.remove(&vehicle.id).unwrap_or_default(),
            vehicle,
        })
        .collect())
}

/// `Fleet_Report_2026-03-10.xlsx` style download name.
pub fn report_file_name(today: Date, extension: &str) -> String {
    format!("Fleet_Report_{today}.{extension}")
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn vehicle_columns(v: &vehicle::Model) -> [&str; 11] {
    [
        text(&v.brand),
        text(&v.model_name),
        text(&v.plate),
        text(&v.garage),
        text(&v.vin),
        text(&v.year),
        text(&v.policy_number),
        text(&v.insurance_date),
        text(&v.inspection_date),
        text(&v.reminder_email),
        text(&v.note),
    ]
}

fn write_vehicle_cells(
    sheet: &mut Worksheet,
    row: RowNum,
    columns: &[&str],
) -> Result<(), XlsxError> {
    for (col, value) in columns.iter().enumerate() {
        if !value.is_empty() {
            sheet.write_string(row, col as ColNum, *value)?;
        }
    }
    Ok(())
}

fn fill_sheet(sheet: &mut Worksheet, reports: &[VehicleReport]) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_NAME)?;
    let header = Format::new().set_bold();
    for (col, (title, width)) in REPORT_HEADERS.iter().zip(XLSX_COLUMN_WIDTHS).enumerate() {
        let col = col as ColNum;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    let mut row: RowNum = 1;
    for report in reports {
        let columns = vehicle_columns(&report.vehicle);
        if report.logs.is_empty() {
            write_vehicle_cells(sheet, row, &columns)?;
            sheet.write_string(row, 13, NO_LOG_ENTRIES)?;
            row += 1;
            continue;
        }
        for entry in &report.logs {
            write_vehicle_cells(sheet, row, &columns)?;
            sheet.write_string(row, 11, entry.event_date.to_string())?;
            sheet.write_number(row, 12, entry.mileage as f64)?;
            sheet.write_string(row, 13, entry.action.as_str())?;
            row += 1;
        }
    }
    Ok(())
}

/// Excel workbook with a single sheet and a bold, frozen header row.
#[tracing::instrument(skip_all, fields(vehicles = reports.len()))]
pub fn render_xlsx(reports: &[VehicleReport]) -> Result<Vec<u8>, ExportError> {
    let xlsx_err = |e: XlsxError| ExportError::Spreadsheet(e.to_string());
    let mut workbook = Workbook::new();
    fill_sheet(workbook.add_worksheet(), reports).map_err(xlsx_err)?;
    workbook.save_to_buffer().map_err(xlsx_err)
}

#[tracing::instrument(skip_all, fields(vehicles = reports.len()))]
pub fn render_csv(reports: &[VehicleReport]) -> Result<Vec<u8>, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv(e.to_string());
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(REPORT_HEADERS).map_err(csv_err)?;

    for report in reports {
        let columns = vehicle_columns(&report.vehicle);
        if report.logs.is_empty() {
            let row = columns.iter().copied().chain(["", "", NO_LOG_ENTRIES]);
            writer.write_record(row).map_err(csv_err)?;
            continue;
        }
        for entry in &report.logs {
            let event_date = entry.event_date.to_string();
            let mileage = entry.mileage.to_string();
            let row = columns.iter().copied().chain([
                event_date.as_str(),
                mileage.as_str(),
                entry.action.as_str(),
            ]);
            writer.write_record(row).map_err(csv_err)?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;
const FOOTER_Y: f32 = 10.0;

// Photo frame in the top right corner, below the title.
const PHOTO_X: f32 = 140.0;
const PHOTO_TOP: f32 = 262.0;
const PHOTO_WIDTH: f32 = 50.0;
const PHOTO_HEIGHT: f32 = 37.5;
const MM_PER_INCH: f32 = 25.4;
const THUMBNAIL_PX: u32 = 600;

// Covers Polish and other Latin Extended text that the PDF base fonts lack.
const FONT_REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Writes lines top to bottom, continuing on a fresh page when one fills up.
struct PdfCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    pages: Vec<PdfLayerReference>,
    y: f32,
}

impl<'a> PdfCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            pages: vec![layer.clone()],
            layer,
            y: PAGE_HEIGHT.0 - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages.push(self.layer.clone());
        self.y = PAGE_HEIGHT.0 - MARGIN;
    }

    /// Writes `cells` on one line, each at its own x offset in mm.
    fn row(&mut self, cells: &[(f32, &str)], size: f32, font: &IndirectFontRef) {
        if self.y < MARGIN {
            self.new_page();
        }
        for (x, text) in cells {
            self.layer.use_text(*text, size, Mm(*x), Mm(self.y), font);
        }
        self.y -= LINE_HEIGHT * (size / 10.0).max(1.0);
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.row(&[(MARGIN, text)], size, font);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT;
    }

    /// Stamps "Page i of N" at the bottom of every page written so far.
    fn number_pages(&self, font: &IndirectFontRef) {
        let total = self.pages.len();
        for (index, layer) in self.pages.iter().enumerate() {
            layer.use_text(
                format!("Page {} of {total}", index + 1),
                8.0,
                Mm(PAGE_WIDTH.0 / 2.0 - 10.0),
                Mm(FOOTER_Y),
                font,
            );
        }
    }
}

/// Location of a stored photo inside `uploads_dir`.
///
/// Only the final path component of the stored value is used, so `/uploads/x.jpg`
/// and a bare `x.jpg` resolve to the same file and nothing outside the directory
/// can be reached.
fn photo_file(uploads_dir: &Path, image_path: Option<&str>) -> Option<PathBuf> {
    let name = Path::new(image_path?.trim()).file_name()?;
    Some(uploads_dir.join(name))
}

fn load_photo(uploads_dir: &Path, v: &vehicle::Model) -> Option<DynamicImage> {
    let file = photo_file(uploads_dir, v.image_path.as_deref())?;
    let decoded = std::fs::read(&file)
        .map_err(|e| e.to_string())
        .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()));
    match decoded {
        Ok(photo) if photo.width() > THUMBNAIL_PX || photo.height() > THUMBNAIL_PX => {
            Some(photo.thumbnail(THUMBNAIL_PX, THUMBNAIL_PX))
        }
        Ok(photo) => Some(photo),
        Err(e) => {
            tracing::warn!(
                name = "export.pdf.photo_unreadable",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                vehicle_id = v.id,
                path = %file.display(),
                error = %e,
                message = "Vehicle photo left out of the report"
            );
            None
        }
    }
}

/// Resolution at which a `width` x `height` pixel image fills the photo frame,
/// with the resulting size in mm.
fn photo_fit(width: u32, height: u32) -> (f32, f32, f32) {
    let dpi = (width as f32 * MM_PER_INCH / PHOTO_WIDTH)
        .max(height as f32 * MM_PER_INCH / PHOTO_HEIGHT)
        .max(1.0);
    let to_mm = |px: u32| px as f32 * MM_PER_INCH / dpi;
    (dpi, to_mm(width), to_mm(height))
}

fn draw_photo(layer: &PdfLayerReference, photo: Option<DynamicImage>, font: &IndirectFontRef) {
    let bottom = PHOTO_TOP - PHOTO_HEIGHT;
    match photo {
        Some(photo) => {
            let (dpi, width, height) = photo_fit(photo.width(), photo.height());
            let rgb = DynamicImage::ImageRgb8(photo.to_rgb8());
            Image::from_dynamic_image(&rgb).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(PHOTO_X + (PHOTO_WIDTH - width) / 2.0)),
                    translate_y: Some(Mm(bottom + (PHOTO_HEIGHT - height) / 2.0)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }
        None => {
            let corners = [
                (PHOTO_X, bottom),
                (PHOTO_X + PHOTO_WIDTH, bottom),
                (PHOTO_X + PHOTO_WIDTH, PHOTO_TOP),
                (PHOTO_X, PHOTO_TOP),
            ];
            let frame = Line {
                points: corners
                    .iter()
                    .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
                    .collect(),
                is_closed: true,
            };
            layer.set_outline_color(Color::Greyscale(Greyscale::new(0.85, None)));
            layer.set_outline_thickness(0.5);
            layer.add_line(frame);
            layer.set_fill_color(Color::Greyscale(Greyscale::new(0.6, None)));
            layer.use_text(
                "No photo",
                8.0,
                Mm(PHOTO_X + PHOTO_WIDTH / 2.0 - 7.0),
                Mm(bottom + PHOTO_HEIGHT / 2.0),
                font,
            );
            layer.set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));
        }
    }
}

/// Renders the PDF report. Photos are read from `uploads_dir`; a vehicle without a
/// readable photo gets an empty frame instead.
#[tracing::instrument(skip_all, fields(vehicles = reports.len()))]
pub fn render_pdf(
    reports: &[VehicleReport],
    generated_on: Date,
    uploads_dir: &Path,
) -> Result<Vec<u8>, ExportError> {
    let pdf_err = |e: printpdf::Error| ExportError::Pdf(format!("{e:?}"));
    let (doc, page, layer) = PdfDocument::new("Fleet report", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let regular = doc.add_external_font(FONT_REGULAR).map_err(pdf_err)?;
    let bold = doc.add_external_font(FONT_BOLD).map_err(pdf_err)?;

    let mut cursor = PdfCursor::new(&doc, doc.get_page(page).get_layer(layer));
    if reports.is_empty() {
        cursor.line("Fleet report", 16.0, &bold);
        cursor.line(&format!("Generated on {generated_on}"), 10.0, &regular);
        cursor.gap();
        cursor.line("No vehicles registered.", 10.0, &regular);
    }

    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            cursor.new_page();
        }
        let v = &report.vehicle;
        cursor.line(&v.display_name(), 16.0, &bold);
        cursor.line(&format!("Generated on {generated_on}"), 9.0, &regular);
        draw_photo(&cursor.layer, load_photo(uploads_dir, v), &regular);
        cursor.gap();

        for (label, value) in REPORT_HEADERS.iter().zip(vehicle_columns(v)) {
            if !value.trim().is_empty() {
                cursor.line(&format!("{label}: {value}"), 10.0, &regular);
            }
        }
        cursor.gap();

        cursor.line("Mileage log", 12.0, &bold);
        if report.logs.is_empty() {
            cursor.line(NO_LOG_ENTRIES, 10.0, &regular);
            continue;
        }
        cursor.row(
            &[(MARGIN, "Date"), (55.0, "Mileage"), (90.0, "Action")],
            10.0,
            &bold,
        );
        for entry in &report.logs {
            let date = entry.event_date.to_string();
            let mileage = format!("{} km", entry.mileage);
            cursor.row(
                &[
                    (MARGIN, date.as_str()),
                    (55.0, mileage.as_str()),
                    (90.0, entry.action.as_str()),
                ],
                10.0,
                &regular,
            );
        }
    }
    cursor.number_pages(&regular);
    drop(cursor);

    doc.save_to_bytes().map_err(pdf_err)
}
