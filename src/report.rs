use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::Result;
use crate::roster::Roster;
use crate::session::CourseInfo;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const MARGIN_MM: f32 = 14.0;
const TABLE_TOP_FIRST_MM: f32 = 55.0;
const TABLE_TOP_MM: f32 = 15.0;
const TABLE_BOTTOM_MM: f32 = 282.0;
const ROW_MM: f32 = 7.0;
const CELL_PAD_MM: f32 = 1.8;
const BODY_SIZE: f32 = 10.0;

/// S/N, Name, Matric, Status, Time
const COLUMNS: [(&str, f32); 5] = [
    ("S/N", 14.0),
    ("Name", 62.0),
    ("Matric", 36.0),
    ("Status", 24.0),
    ("Time", 46.0),
];

const GREEN: (f32, f32, f32) = (22.0 / 255.0, 163.0 / 255.0, 74.0 / 255.0);
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);

/// One line of the register table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub serial: usize,
    pub name: String,
    pub matric: String,
    pub status: String,
    pub time: String,
}

/// Snapshot of the register at export time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceReport {
    pub institution: String,
    pub course: CourseInfo,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub rows: Vec<ReportRow>,
}

impl AttendanceReport {
    pub fn new(institution: &str, course: &CourseInfo, roster: &Roster) -> Self {
        let rows = roster
            .students()
            .iter()
            .enumerate()
            .map(|(i, s)| ReportRow {
                serial: i + 1,
                name: s.name.clone(),
                matric: s.matric.clone(),
                status: s.status.to_string(),
                time: s.check_in_time.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let present = roster.present_count();
        Self {
            institution: institution.to_string(),
            course: course.clone(),
            total: roster.len(),
            present,
            absent: roster.len() - present,
            rows,
        }
    }

    /// `<course code>_Attendance.pdf`, with path separators replaced
    pub fn file_name(&self) -> String {
        let code: String = self
            .course
            .course_code
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        format!("{}_Attendance.pdf", code)
    }

    /// Write the PDF into `dir` under [`file_name`](Self::file_name)
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save(&path)?;
        Ok(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.render_pdf()?;
        fs::write(path, bytes)?;
        info!("Saved register with {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (index, chunk) in self.paginate().into_iter().enumerate() {
            let mut page = PageWriter::default();
            let table_top = if index == 0 {
                self.write_heading(&mut page);
                TABLE_TOP_FIRST_MM
            } else {
                TABLE_TOP_MM
            };
            page.table(table_top, chunk);

            let content = Content {
                operations: page.ops,
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), (PAGE_WIDTH as i64).into(), (PAGE_HEIGHT as i64).into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode(&format!("{} Attendance", self.course.course_code)), StringFormat::Literal),
            "Producer" => Object::String(b"attendscan".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Split rows over pages. Always at least one page, even for an empty roster.
    fn paginate(&self) -> Vec<&[ReportRow]> {
        let first = rows_fitting(TABLE_TOP_FIRST_MM);
        let rest = rows_fitting(TABLE_TOP_MM);

        let mut pages = Vec::new();
        let split = first.min(self.rows.len());
        pages.push(&self.rows[..split]);
        pages.extend(self.rows[split..].chunks(rest));
        pages
    }

    fn write_heading(&self, page: &mut PageWriter) {
        page.text_centered(&self.institution, 105.0, 15.0, 16.0, true, GREEN);

        let course = &self.course;
        page.text(&format!("Department: {}", course.department), MARGIN_MM, 25.0, 11.0, false, BLACK);
        page.text(&format!("Course: {}", course.course_code), MARGIN_MM, 32.0, 11.0, false, BLACK);
        page.text(&format!("Level: {}", course.level), MARGIN_MM, 39.0, 11.0, false, BLACK);
        page.text(&format!("Date: {}", course.date), 150.0, 25.0, 11.0, false, BLACK);

        page.text(&format!("Total Students: {}", self.total), MARGIN_MM, 48.0, 11.0, false, BLACK);
        page.text(&format!("Present: {}", self.present), 80.0, 48.0, 11.0, false, BLACK);
        page.text(&format!("Absent: {}", self.absent), 150.0, 48.0, 11.0, false, BLACK);
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Body rows that fit below a header row starting at `top_mm`
fn rows_fitting(top_mm: f32) -> usize {
    (((TABLE_BOTTOM_MM - top_mm - ROW_MM) / ROW_MM).floor() as usize).max(1)
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

/// Latin-1 bytes for the standard fonts; anything outside becomes `?`
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
        .collect()
}

/// Rough Helvetica advance width
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.52
}

/// Trim `text` with an ellipsis so it fits `max_width` points
fn fit_text(text: &str, max_width: f32, size: f32) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let max_chars = ((max_width / (size * 0.52)) as usize).saturating_sub(3);
    let mut fitted: String = text.chars().take(max_chars).collect();
    fitted.push_str("...");
    fitted
}

fn x_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

fn y_pt(mm: f32) -> f32 {
    PAGE_HEIGHT - mm * PT_PER_MM
}

#[derive(Default)]
struct PageWriter {
    ops: Vec<Operation>,
}

impl PageWriter {
    /// Text with its baseline at (`x_mm`, `y_mm`) measured from the top-left
    fn text(&mut self, text: &str, x_mm: f32, y_mm: f32, size: f32, bold: bool, color: (f32, f32, f32)) {
        self.text_at(text, x_pt(x_mm), y_pt(y_mm), size, bold, color);
    }

    fn text_centered(&mut self, text: &str, center_mm: f32, y_mm: f32, size: f32, bold: bool, color: (f32, f32, f32)) {
        let x = x_pt(center_mm) - text_width(text, size) / 2.0;
        self.text_at(text, x, y_pt(y_mm), size, bold, color);
    }

    fn text_at(&mut self, text: &str, x: f32, y: f32, size: f32, bold: bool, color: (f32, f32, f32)) {
        let font = if bold { "F2" } else { "F1" };
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), real(size)]),
            Operation::new("rg", vec![real(color.0), real(color.1), real(color.2)]),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new("Tj", vec![Object::String(encode(text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rect(&mut self, x_mm: f32, top_mm: f32, width_mm: f32, height_mm: f32, op: &str) {
        self.ops.push(Operation::new(
            "re",
            vec![
                real(x_pt(x_mm)),
                real(y_pt(top_mm + height_mm)),
                real(width_mm * PT_PER_MM),
                real(height_mm * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new(op, vec![]));
    }

    fn row(&mut self, cells: [&str; 5], top_mm: f32, header: bool) {
        let table_width: f32 = COLUMNS.iter().map(|(_, w)| w).sum();
        if header {
            self.ops.push(Operation::new("rg", vec![real(GREEN.0), real(GREEN.1), real(GREEN.2)]));
            self.rect(MARGIN_MM, top_mm, table_width, ROW_MM, "f");
        }

        self.ops.push(Operation::new("RG", vec![real(0.78), real(0.78), real(0.78)]));
        self.ops.push(Operation::new("w", vec![real(0.5)]));

        let color = if header { WHITE } else { BLACK };
        let mut x = MARGIN_MM;
        for (cell, (_, width)) in cells.iter().zip(COLUMNS.iter()) {
            self.rect(x, top_mm, *width, ROW_MM, "S");
            let max_width = (width - 2.0 * CELL_PAD_MM) * PT_PER_MM;
            let fitted = fit_text(cell, max_width, BODY_SIZE);
            self.text(&fitted, x + CELL_PAD_MM, top_mm + ROW_MM - 2.2, BODY_SIZE, header, color);
            x += width;
        }
    }

    fn table(&mut self, top_mm: f32, rows: &[ReportRow]) {
        let headings = COLUMNS.map(|(title, _)| title);
        self.row(headings, top_mm, true);

        for (i, row) in rows.iter().enumerate() {
            let serial = row.serial.to_string();
            let cells = [
                serial.as_str(),
                row.name.as_str(),
                row.matric.as_str(),
                row.status.as_str(),
                row.time.as_str(),
            ];
            self.row(cells, top_mm + ROW_MM * (i + 1) as f32, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_text_keeps_short_text() {
        assert_eq!(fit_text("Bello Aishat", 200.0, 10.0), "Bello Aishat");
    }

    #[test]
    fn fit_text_adds_ellipsis() {
        let fitted = fit_text(&"x".repeat(100), 60.0, 10.0);
        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() < 100);
    }

    #[test]
    fn encode_replaces_non_latin1() {
        assert_eq!(encode("Né✅"), vec![b'N', 0xE9, b'?']);
    }
}
