// src/filing/identity.rs
use crate::utils::error::ExtractError;
use serde::Serialize;
use std::path::Path;

/// Two-digit years below this pivot belong to the 2000s, the rest to the 1900s.
pub const CENTURY_PIVOT: u32 = 30;

/// Who filed and for which year. Derived once per input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilingIdentity {
    pub company: String,
    pub fiscal_year: u32,
}

impl FilingIdentity {
    pub fn new(company: impl Into<String>, fiscal_year: u32) -> Self {
        Self { company: company.into(), fiscal_year }
    }

    /// Derives the identity from the downloader's storage layout:
    /// `<root>/<COMPANY>/<FORM>/<ACCESSION>/<file>`, where the accession
    /// looks like `0000320193-05-000123` and its middle field is the year.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let invalid = || ExtractError::InvalidFilingPath(path.display().to_string());

        let accession_dir = path.parent().ok_or_else(invalid)?;
        let form_dir = accession_dir.parent().ok_or_else(invalid)?;
        let company_dir = form_dir.parent().ok_or_else(invalid)?;

        let company = company_dir
            .file_name()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;
        let accession = accession_dir
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?;

        let year_two_digit = accession.split('-').nth(1).ok_or_else(invalid)?;
        if year_two_digit.len() != 2 {
            return Err(invalid());
        }
        let two_digit: u32 = year_two_digit.parse().map_err(|_| invalid())?;

        Ok(Self::new(company, expand_year(two_digit)))
    }
}

/// 99 -> 1999, 05 -> 2005.
pub fn expand_year(two_digit: u32) -> u32 {
    if two_digit < CENTURY_PIVOT {
        2000 + two_digit
    } else {
        1900 + two_digit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_year_expansion_pivot() {
        assert_eq!(expand_year(99), 1999);
        assert_eq!(expand_year(5), 2005);
        assert_eq!(expand_year(29), 2029);
        assert_eq!(expand_year(30), 1930);
        assert_eq!(expand_year(0), 2000);
    }

    #[test]
    fn test_identity_from_downloader_layout() {
        let path = PathBuf::from("sec-edgar-filings/AAPL/10-K/0001047469-04-035975/full-submission.txt");
        let identity = FilingIdentity::from_path(&path).unwrap();
        assert_eq!(identity, FilingIdentity::new("AAPL", 2004));

        let old = PathBuf::from("/data/filings/KO/10-K/0000021344-99-000009/full-submission.txt");
        assert_eq!(FilingIdentity::from_path(&old).unwrap(), FilingIdentity::new("KO", 1999));
    }

    #[test]
    fn test_malformed_paths_are_rejected() {
        for bad in [
            "full-submission.txt",
            "10-K/0001047469-04-035975/full-submission.txt",
            "sec-edgar-filings/AAPL/10-K/no_dashes_here/full-submission.txt",
            "sec-edgar-filings/AAPL/10-K/0001047469-2004-035975/full-submission.txt",
            "sec-edgar-filings/AAPL/10-K/0001047469-xx-035975/full-submission.txt",
        ] {
            let err = FilingIdentity::from_path(Path::new(bad)).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidFilingPath(_)), "{}", bad);
        }
    }
}
