// src/common/normalize.rs

// Normalizadores puros para os campos do export Protheus.
// Nenhuma função aqui tem efeito colateral; falhas viram fallbacks definidos.

use chrono::NaiveDate;

/// Remove tudo que não for dígito.
/// "12.345.678/0001-99" -> "12345678000199"
pub fn clean_document(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Interpreta um número no formato brasileiro: `.` separa milhares e `,` é
/// o separador decimal ("1.234,56" -> 1234.56).
///
/// Campo vazio ou malformado vira `0.0`: o arquivo legado traz lixo em
/// campos numéricos e a importação não pode abortar por causa de um deles.
pub fn parse_brl_float(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Data no formato legado `dd/MM/yyyy`.
///
/// Retorna `None` em caso de falha: quem chama decide o fallback e registra
/// a perda de qualidade do dado, em vez de escondê-la aqui.
pub fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_document_remove_pontuacao() {
        assert_eq!(clean_document("12.345.678/0001-99"), "12345678000199");
        assert_eq!(clean_document("  111.222.333-44 "), "11122233344");
        assert_eq!(clean_document(""), "");
        assert_eq!(clean_document("sem digitos"), "");
    }

    #[test]
    fn parse_brl_float_formato_brasileiro() {
        assert_eq!(parse_brl_float("1.234,56"), 1234.56);
        assert_eq!(parse_brl_float("10,00"), 10.0);
        assert_eq!(parse_brl_float("5"), 5.0);
        assert_eq!(parse_brl_float(""), 0.0);
        assert_eq!(parse_brl_float("   "), 0.0);
    }

    #[test]
    fn parse_brl_float_malformado_vira_zero() {
        assert_eq!(parse_brl_float("abc"), 0.0);
        assert_eq!(parse_brl_float("1,2,3"), 0.0);
    }

    #[test]
    fn parse_legacy_date_dd_mm_yyyy() {
        assert_eq!(
            parse_legacy_date("15/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_legacy_date(" 01/01/2020 "), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(parse_legacy_date("2024-03-15"), None);
        assert_eq!(parse_legacy_date("31/02/2024"), None);
        assert_eq!(parse_legacy_date(""), None);
    }
}
