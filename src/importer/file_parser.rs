// ==========================================
// 外贸统计导入管道 - 工作簿读取
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb/.ods) / CSV (.csv)
// 职责: 将整个工作簿一次性读入内存（不假设表头位置）
// ==========================================

use crate::importer::error::{EtlError, EtlResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 支持的工作簿扩展名（小写）
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv"];

// ==========================================
// Cell - 单元格
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
}

impl Cell {
    /// 单元格转文本
    ///
    /// 整数值浮点（如 803901100.0）输出为不带小数的形式，保证编码列不被污染
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Number(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Int(*i),
            Data::Bool(b) => Cell::Bool(*b),
            // 日期/错误值等按显示文本保留
            other => Cell::Text(other.to_string()),
        }
    }
}

// ==========================================
// Sheet / Workbook
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// 源文件名（用于行溯源）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// 判断文件扩展名是否为支持的工作簿格式
pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 打开工作簿（根据扩展名自动选择解析器）
pub fn open_workbook<P: AsRef<Path>>(file_path: P) -> EtlResult<Workbook> {
    let path = file_path.as_ref();

    if !path.exists() {
        return Err(EtlError::FileReadError(format!(
            "文件不存在: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let workbook = match ext.as_str() {
        "csv" => read_csv_workbook(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_excel_workbook(path)?,
        _ => return Err(EtlError::UnsupportedFormat(ext)),
    };

    debug!(
        file = %path.display(),
        sheets = workbook.sheets.len(),
        "工作簿读取完成"
    );
    Ok(workbook)
}

fn read_excel_workbook(path: &Path) -> EtlResult<Workbook> {
    let mut workbook = open_workbook_auto(path)?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        sheets.push(Sheet {
            name: sheet_name,
            rows,
        });
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

/// CSV 作为单工作表的工作簿读取（工作表名取文件名主干）
fn read_csv_workbook(path: &Path) -> EtlResult<Workbook> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false) // 表头位置由检测器决定
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let mut rows = Vec::new();
    // 按字节读取，非 UTF-8 字节只影响所在单元格
    for result in reader.byte_records() {
        let record = result?;
        let row = record
            .iter()
            .map(|bytes| {
                let value = String::from_utf8_lossy(bytes);
                if value.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(value.into_owned())
                }
            })
            .collect();
        rows.push(row);
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets: vec![Sheet { name, rows }],
    })
}

// ==========================================
// SheetTable - 指定表头行后的二维表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// 以 header_row 行为表头构建表；其后的完全空白行被跳过
    pub fn from_sheet(sheet: &Sheet, header_row: usize) -> Self {
        let headers = sheet
            .rows
            .get(header_row)
            .map(|row| row.iter().map(|c| c.as_text().trim().to_string()).collect())
            .unwrap_or_default();

        let rows = sheet
            .rows
            .iter()
            .skip(header_row + 1)
            .filter(|row| !row.iter().all(Cell::is_empty))
            .cloned()
            .collect();

        Self { headers, rows }
    }

    /// 取单元格（行长度不足时视为空）
    pub fn cell<'a>(row: &'a [Cell], col: usize) -> &'a Cell {
        const EMPTY: &Cell = &Cell::Empty;
        row.get(col).unwrap_or(EMPTY)
    }

    /// 可选列取值
    pub fn opt_cell<'a>(row: &'a [Cell], col: Option<usize>) -> &'a Cell {
        const EMPTY: &Cell = &Cell::Empty;
        match col {
            Some(idx) => Self::cell(row, idx),
            None => EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_cell_as_text_integral_float() {
        assert_eq!(Cell::Number(803901100.0).as_text(), "803901100");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
        assert_eq!(Cell::Int(156).as_text(), "156");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn test_csv_workbook_single_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "diccionario.csv", "titulo\nhs10,descripcion_final\n0803901100,Banano\n");

        let workbook = open_workbook(&path).unwrap();

        assert_eq!(workbook.sheets.len(), 1);
        assert_eq!(workbook.sheets[0].name, "diccionario");
        assert_eq!(workbook.sheets[0].rows.len(), 3);
        assert_eq!(workbook.file_name(), "diccionario.csv");
    }

    #[test]
    fn test_csv_latin1_byte_only_affects_its_cell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export_latin1.csv");
        // "Camar\xf3n" 为 Latin-1 编码
        let mut bytes = b"Periodo,Descripcion\n2024-01,Camar".to_vec();
        bytes.push(0xF3);
        bytes.extend_from_slice(b"n\n2024-02,Banano\n");
        std::fs::write(&path, bytes).unwrap();

        let workbook = open_workbook(&path).unwrap();
        let rows = &workbook.sheets[0].rows;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], Cell::Text("2024-01".to_string()));
        assert_eq!(rows[1][1], Cell::Text("Camar\u{FFFD}n".to_string()));
        assert_eq!(rows[2][1], Cell::Text("Banano".to_string()));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notas.txt", "hola");

        let result = open_workbook(&path);
        assert!(matches!(result, Err(EtlError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_file_not_found() {
        let result = open_workbook("no_existe.xlsx");
        assert!(matches!(result, Err(EtlError::FileReadError(_))));
    }

    #[test]
    fn test_sheet_table_skips_blank_rows() {
        let sheet = Sheet {
            name: "s".to_string(),
            rows: vec![
                vec![Cell::Text("meta".to_string())],
                vec![Cell::Text("a".to_string()), Cell::Text("b".to_string())],
                vec![Cell::Text("1".to_string()), Cell::Text("2".to_string())],
                vec![Cell::Empty, Cell::Text("  ".to_string())],
                vec![Cell::Text("3".to_string())],
            ],
        };

        let table = SheetTable::from_sheet(&sheet, 1);

        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(SheetTable::cell(&table.rows[1], 1), &Cell::Empty);
    }

    #[test]
    fn test_is_workbook_path() {
        assert!(is_workbook_path(Path::new("a/EXPORTACIONES.XLSX")));
        assert!(is_workbook_path(Path::new("b.csv")));
        assert!(!is_workbook_path(Path::new("c.parquet")));
    }
}
