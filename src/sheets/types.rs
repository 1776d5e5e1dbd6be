//! Tipos de dados para requisições e respostas da API Google Sheets v4,
//! além de utilitários de endereçamento A1 (letra de coluna ↔ índice).
//!
//! Todas as structs derivam `Serialize`/`Deserialize` conforme o formato
//! JSON dos endpoints `spreadsheets.values` e `spreadsheets.get`.

use serde::{Deserialize, Serialize};

/// Corpo de leitura/escrita de valores (`spreadsheets.values`).
///
/// Na leitura, `values` vem ausente quando o intervalo está vazio; na
/// escrita, enviamos apenas `values`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// Intervalo em notação A1 (ex.: "Sheet1!A1:B10"). Ausente na escrita.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Linhas de células; cada célula é texto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<String>>>,
}

/// Metadados da planilha (`spreadsheets.get?fields=sheets.properties`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetProperties {
    pub title: String,
}

/// Resposta da busca de arquivos do Drive (resolução de planilha por nome).
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
}

/// Converte uma letra de coluna ("A", "B", … "AA") no índice 1-based.
///
/// Retorna `None` para entradas vazias ou com caracteres fora de A-Z.
pub fn col_index(letter: &str) -> Option<usize> {
    let letter = letter.trim();
    if letter.is_empty() {
        return None;
    }
    let mut idx: usize = 0;
    for c in letter.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        idx = idx * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(idx)
}

/// Converte um índice 1-based na letra de coluna correspondente.
pub fn col_letter(mut index: usize) -> String {
    debug_assert!(index >= 1);
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_index_single_letters() {
        assert_eq!(col_index("A"), Some(1));
        assert_eq!(col_index("b"), Some(2));
        assert_eq!(col_index("Z"), Some(26));
    }

    #[test]
    fn col_index_double_letters() {
        assert_eq!(col_index("AA"), Some(27));
        assert_eq!(col_index("AZ"), Some(52));
        assert_eq!(col_index("BA"), Some(53));
    }

    #[test]
    fn col_index_rejects_garbage() {
        assert_eq!(col_index(""), None);
        assert_eq!(col_index("1"), None);
        assert_eq!(col_index("A1"), None);
        assert_eq!(col_index(" "), None);
    }

    #[test]
    fn col_letter_roundtrips() {
        for idx in [1, 2, 26, 27, 52, 53, 702, 703] {
            assert_eq!(col_index(&col_letter(idx)), Some(idx));
        }
        assert_eq!(col_letter(1), "A");
        assert_eq!(col_letter(28), "AB");
    }

    #[test]
    fn value_range_read_with_missing_values() {
        let json = r#"{"range": "Sheet1!A1:B2", "majorDimension": "ROWS"}"#;
        let vr: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(vr.range.as_deref(), Some("Sheet1!A1:B2"));
        assert!(vr.values.is_none());
    }

    #[test]
    fn value_range_write_serializes_values_only() {
        let vr = ValueRange {
            range: None,
            values: Some(vec![vec!["SENDING".to_string()]]),
        };
        let json = serde_json::to_string(&vr).unwrap();
        assert_eq!(json, r#"{"values":[["SENDING"]]}"#);
    }

    #[test]
    fn spreadsheet_meta_deserializes_sheet_titles() {
        let json = r#"{"sheets": [
            {"properties": {"title": "Requests", "sheetId": 0}},
            {"properties": {"title": "Quota", "sheetId": 1}}
        ]}"#;
        let meta: SpreadsheetMeta = serde_json::from_str(json).unwrap();
        let titles: Vec<_> = meta.sheets.iter().map(|s| s.properties.title.as_str()).collect();
        assert_eq!(titles, vec!["Requests", "Quota"]);
    }

    #[test]
    fn drive_file_list_deserializes() {
        let json = r#"{"files": [{"id": "abc123", "name": "sheet-bot"}]}"#;
        let list: DriveFileList = serde_json::from_str(json).unwrap();
        assert_eq!(list.files[0].id, "abc123");
    }
}
