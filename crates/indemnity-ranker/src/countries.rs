//! Country reference table and name translation
//!
//! International datasets publish English short names ("Germany",
//! "Korea, Republic of") while the primary indemnity file is keyed by
//! French display names ("Allemagne", "Corée, République de"). The
//! reference table bridges the two before normalization so that both
//! sides have a chance to produce the same comparison key.
//!
//! # Lookup Rules
//!
//! | Key | Example | Result |
//! |-----|---------|--------|
//! | English short name (exact) | `Germany` | `Allemagne` |
//! | ISO 3166-1 alpha-2 (exact) | `DE` | `Allemagne` |
//! | anything else | `Korea, Rep.` | unchanged |

use crate::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// One entry of the ISO 3166-1 reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// English short name
    pub name: String,
    /// French short name, when a translation exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_fr: Option<String>,
}

impl CountryEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>, name_fr: Option<&str>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            name_fr: name_fr.map(str::to_string),
        }
    }
}

/// Read-only country lookup, keyed by English name and by alpha-2 code
#[derive(Debug, Clone, Default)]
pub struct CountryDatabase {
    entries: Vec<CountryEntry>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl CountryDatabase {
    /// Create new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create database with the built-in ISO 3166-1 table
    pub fn with_defaults() -> Self {
        let mut db = Self::new();
        db.load_default_data();
        db
    }

    /// Build a database from explicit entries (later duplicates win)
    pub fn from_entries(entries: impl IntoIterator<Item = CountryEntry>) -> Self {
        let mut db = Self::new();
        for entry in entries {
            db.insert(entry);
        }
        db
    }

    /// Load a replacement table from a JSON array of entries
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading country table from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let entries: Vec<CountryEntry> = serde_json::from_reader(reader)?;

        if entries.is_empty() {
            return Err(ReconcileError::CountryTable(format!(
                "{} contains no entries",
                path.display()
            )));
        }

        let db = Self::from_entries(entries);
        info!("Loaded {} country entries", db.len());
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup by English name, then by alpha-2 code
    pub fn get(&self, key: &str) -> Option<&CountryEntry> {
        self.by_name
            .get(key)
            .or_else(|| self.by_code.get(key))
            .map(|&i| &self.entries[i])
    }

    /// French name for `name`, if the entry exists and carries a translation
    pub fn translate(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|entry| entry.name_fr.as_deref())
    }

    /// French name for `name`, or `name` itself when no translation exists
    pub fn translate_or_identity<'a>(&'a self, name: &'a str) -> &'a str {
        self.translate(name).unwrap_or(name)
    }

    fn insert(&mut self, entry: CountryEntry) {
        let idx = self.entries.len();
        self.by_name.insert(entry.name.clone(), idx);
        self.by_code.insert(entry.code.clone(), idx);
        self.entries.push(entry);
    }

    fn add_country(&mut self, code: &str, name: &str, name_fr: &str) {
        self.insert(CountryEntry::new(code, name, Some(name_fr)));
    }

    /// Load the built-in ISO 3166-1 table (English and French short names)
    pub fn load_default_data(&mut self) {
        self.add_country("AF", "Afghanistan", "Afghanistan");
        self.add_country("AX", "Åland Islands", "Åland, Îles");
        self.add_country("AL", "Albania", "Albanie");
        self.add_country("DZ", "Algeria", "Algérie");
        self.add_country("AS", "American Samoa", "Samoa américaines");
        self.add_country("AD", "Andorra", "Andorre");
        self.add_country("AO", "Angola", "Angola");
        self.add_country("AI", "Anguilla", "Anguilla");
        self.add_country("AQ", "Antarctica", "Antarctique");
        self.add_country("AG", "Antigua and Barbuda", "Antigua-et-Barbuda");
        self.add_country("AR", "Argentina", "Argentine");
        self.add_country("AM", "Armenia", "Arménie");
        self.add_country("AW", "Aruba", "Aruba");
        self.add_country("AU", "Australia", "Australie");
        self.add_country("AT", "Austria", "Autriche");
        self.add_country("AZ", "Azerbaijan", "Azerbaïdjan");
        self.add_country("BS", "Bahamas", "Bahamas");
        self.add_country("BH", "Bahrain", "Bahreïn");
        self.add_country("BD", "Bangladesh", "Bangladesh");
        self.add_country("BB", "Barbados", "Barbade");
        self.add_country("BY", "Belarus", "Bélarus");
        self.add_country("BE", "Belgium", "Belgique");
        self.add_country("BZ", "Belize", "Belize");
        self.add_country("BJ", "Benin", "Bénin");
        self.add_country("BM", "Bermuda", "Bermudes");
        self.add_country("BT", "Bhutan", "Bhoutan");
        self.add_country("BO", "Bolivia, Plurinational State of", "Bolivie, l'État plurinational de");
        self.add_country("BQ", "Bonaire, Sint Eustatius and Saba", "Bonaire, Saint-Eustache et Saba");
        self.add_country("BA", "Bosnia and Herzegovina", "Bosnie-Herzégovine");
        self.add_country("BW", "Botswana", "Botswana");
        self.add_country("BV", "Bouvet Island", "Bouvet, Île");
        self.add_country("BR", "Brazil", "Brésil");
        self.add_country("IO", "British Indian Ocean Territory", "Océan Indien, Territoire britannique de l'");
        self.add_country("BN", "Brunei Darussalam", "Brunei Darussalam");
        self.add_country("BG", "Bulgaria", "Bulgarie");
        self.add_country("BF", "Burkina Faso", "Burkina Faso");
        self.add_country("BI", "Burundi", "Burundi");
        self.add_country("CV", "Cabo Verde", "Cabo Verde");
        self.add_country("KH", "Cambodia", "Cambodge");
        self.add_country("CM", "Cameroon", "Cameroun");
        self.add_country("CA", "Canada", "Canada");
        self.add_country("KY", "Cayman Islands", "Caïmans, Îles");
        self.add_country("CF", "Central African Republic", "Centrafricaine, République");
        self.add_country("TD", "Chad", "Tchad");
        self.add_country("CL", "Chile", "Chili");
        self.add_country("CN", "China", "Chine");
        self.add_country("CX", "Christmas Island", "Christmas, Île");
        self.add_country("CC", "Cocos (Keeling) Islands", "Cocos (Keeling), Îles");
        self.add_country("CO", "Colombia", "Colombie");
        self.add_country("KM", "Comoros", "Comores");
        self.add_country("CG", "Congo", "Congo");
        self.add_country("CD", "Congo, The Democratic Republic of the", "Congo, République démocratique du");
        self.add_country("CK", "Cook Islands", "Cook, Îles");
        self.add_country("CR", "Costa Rica", "Costa Rica");
        self.add_country("CI", "Côte d'Ivoire", "Côte d'Ivoire");
        self.add_country("HR", "Croatia", "Croatie");
        self.add_country("CU", "Cuba", "Cuba");
        self.add_country("CW", "Curaçao", "Curaçao");
        self.add_country("CY", "Cyprus", "Chypre");
        self.add_country("CZ", "Czechia", "Tchéquie");
        self.add_country("DK", "Denmark", "Danemark");
        self.add_country("DJ", "Djibouti", "Djibouti");
        self.add_country("DM", "Dominica", "Dominique");
        self.add_country("DO", "Dominican Republic", "Dominicaine, République");
        self.add_country("EC", "Ecuador", "Équateur");
        self.add_country("EG", "Egypt", "Égypte");
        self.add_country("SV", "El Salvador", "El Salvador");
        self.add_country("GQ", "Equatorial Guinea", "Guinée équatoriale");
        self.add_country("ER", "Eritrea", "Érythrée");
        self.add_country("EE", "Estonia", "Estonie");
        self.add_country("SZ", "Eswatini", "Eswatini");
        self.add_country("ET", "Ethiopia", "Éthiopie");
        self.add_country("FK", "Falkland Islands (Malvinas)", "Falkland, Îles (Malvinas)");
        self.add_country("FO", "Faroe Islands", "Féroé, Îles");
        self.add_country("FJ", "Fiji", "Fidji");
        self.add_country("FI", "Finland", "Finlande");
        self.add_country("FR", "France", "France");
        self.add_country("GF", "French Guiana", "Guyane française");
        self.add_country("PF", "French Polynesia", "Polynésie française");
        self.add_country("TF", "French Southern Territories", "Terres australes françaises");
        self.add_country("GA", "Gabon", "Gabon");
        self.add_country("GM", "Gambia", "Gambie");
        self.add_country("GE", "Georgia", "Géorgie");
        self.add_country("DE", "Germany", "Allemagne");
        self.add_country("GH", "Ghana", "Ghana");
        self.add_country("GI", "Gibraltar", "Gibraltar");
        self.add_country("GR", "Greece", "Grèce");
        self.add_country("GL", "Greenland", "Groenland");
        self.add_country("GD", "Grenada", "Grenade");
        self.add_country("GP", "Guadeloupe", "Guadeloupe");
        self.add_country("GU", "Guam", "Guam");
        self.add_country("GT", "Guatemala", "Guatemala");
        self.add_country("GG", "Guernsey", "Guernesey");
        self.add_country("GN", "Guinea", "Guinée");
        self.add_country("GW", "Guinea-Bissau", "Guinée-Bissau");
        self.add_country("GY", "Guyana", "Guyana");
        self.add_country("HT", "Haiti", "Haïti");
        self.add_country("HM", "Heard Island and McDonald Islands", "Heard, Île et McDonald, Îles");
        self.add_country("VA", "Holy See (Vatican City State)", "Saint-Siège (État de la Cité du Vatican)");
        self.add_country("HN", "Honduras", "Honduras");
        self.add_country("HK", "Hong Kong", "Hong Kong");
        self.add_country("HU", "Hungary", "Hongrie");
        self.add_country("IS", "Iceland", "Islande");
        self.add_country("IN", "India", "Inde");
        self.add_country("ID", "Indonesia", "Indonésie");
        self.add_country("IR", "Iran, Islamic Republic of", "Iran, République islamique d'");
        self.add_country("IQ", "Iraq", "Iraq");
        self.add_country("IE", "Ireland", "Irlande");
        self.add_country("IM", "Isle of Man", "Île de Man");
        self.add_country("IL", "Israel", "Israël");
        self.add_country("IT", "Italy", "Italie");
        self.add_country("JM", "Jamaica", "Jamaïque");
        self.add_country("JP", "Japan", "Japon");
        self.add_country("JE", "Jersey", "Jersey");
        self.add_country("JO", "Jordan", "Jordanie");
        self.add_country("KZ", "Kazakhstan", "Kazakhstan");
        self.add_country("KE", "Kenya", "Kenya");
        self.add_country("KI", "Kiribati", "Kiribati");
        self.add_country("KP", "Korea, Democratic People's Republic of", "Corée, République populaire démocratique de");
        self.add_country("KR", "Korea, Republic of", "Corée, République de");
        self.add_country("KW", "Kuwait", "Koweït");
        self.add_country("KG", "Kyrgyzstan", "Kirghizistan");
        self.add_country("LA", "Lao People's Democratic Republic", "Lao, République démocratique populaire");
        self.add_country("LV", "Latvia", "Lettonie");
        self.add_country("LB", "Lebanon", "Liban");
        self.add_country("LS", "Lesotho", "Lesotho");
        self.add_country("LR", "Liberia", "Libéria");
        self.add_country("LY", "Libya", "Libye");
        self.add_country("LI", "Liechtenstein", "Liechtenstein");
        self.add_country("LT", "Lithuania", "Lituanie");
        self.add_country("LU", "Luxembourg", "Luxembourg");
        self.add_country("MO", "Macao", "Macao");
        self.add_country("MG", "Madagascar", "Madagascar");
        self.add_country("MW", "Malawi", "Malawi");
        self.add_country("MY", "Malaysia", "Malaisie");
        self.add_country("MV", "Maldives", "Maldives");
        self.add_country("ML", "Mali", "Mali");
        self.add_country("MT", "Malta", "Malte");
        self.add_country("MH", "Marshall Islands", "Marshall, Îles");
        self.add_country("MQ", "Martinique", "Martinique");
        self.add_country("MR", "Mauritania", "Mauritanie");
        self.add_country("MU", "Mauritius", "Maurice");
        self.add_country("YT", "Mayotte", "Mayotte");
        self.add_country("MX", "Mexico", "Mexique");
        self.add_country("FM", "Micronesia, Federated States of", "Micronésie, États fédérés de");
        self.add_country("MD", "Moldova, Republic of", "Moldavie, République de");
        self.add_country("MC", "Monaco", "Monaco");
        self.add_country("MN", "Mongolia", "Mongolie");
        self.add_country("ME", "Montenegro", "Monténégro");
        self.add_country("MS", "Montserrat", "Montserrat");
        self.add_country("MA", "Morocco", "Maroc");
        self.add_country("MZ", "Mozambique", "Mozambique");
        self.add_country("MM", "Myanmar", "Myanmar");
        self.add_country("NA", "Namibia", "Namibie");
        self.add_country("NR", "Nauru", "Nauru");
        self.add_country("NP", "Nepal", "Népal");
        self.add_country("NL", "Netherlands", "Pays-Bas");
        self.add_country("NC", "New Caledonia", "Nouvelle-Calédonie");
        self.add_country("NZ", "New Zealand", "Nouvelle-Zélande");
        self.add_country("NI", "Nicaragua", "Nicaragua");
        self.add_country("NE", "Niger", "Niger");
        self.add_country("NG", "Nigeria", "Nigéria");
        self.add_country("NU", "Niue", "Niué");
        self.add_country("NF", "Norfolk Island", "Norfolk, Île");
        self.add_country("MK", "North Macedonia", "Macédoine du Nord");
        self.add_country("MP", "Northern Mariana Islands", "Mariannes du Nord, Îles");
        self.add_country("NO", "Norway", "Norvège");
        self.add_country("OM", "Oman", "Oman");
        self.add_country("PK", "Pakistan", "Pakistan");
        self.add_country("PW", "Palau", "Palaos");
        self.add_country("PS", "Palestine, State of", "Palestine, État de");
        self.add_country("PA", "Panama", "Panama");
        self.add_country("PG", "Papua New Guinea", "Papouasie-Nouvelle-Guinée");
        self.add_country("PY", "Paraguay", "Paraguay");
        self.add_country("PE", "Peru", "Pérou");
        self.add_country("PH", "Philippines", "Philippines");
        self.add_country("PN", "Pitcairn", "Pitcairn");
        self.add_country("PL", "Poland", "Pologne");
        self.add_country("PT", "Portugal", "Portugal");
        self.add_country("PR", "Puerto Rico", "Porto Rico");
        self.add_country("QA", "Qatar", "Qatar");
        self.add_country("RE", "Réunion", "Réunion");
        self.add_country("RO", "Romania", "Roumanie");
        self.add_country("RU", "Russian Federation", "Russie, Fédération de");
        self.add_country("RW", "Rwanda", "Rwanda");
        self.add_country("BL", "Saint Barthélemy", "Saint-Barthélemy");
        self.add_country("SH", "Saint Helena, Ascension and Tristan da Cunha", "Sainte-Hélène, Ascension et Tristan da Cunha");
        self.add_country("KN", "Saint Kitts and Nevis", "Saint-Kitts-et-Nevis");
        self.add_country("LC", "Saint Lucia", "Sainte-Lucie");
        self.add_country("MF", "Saint Martin (French part)", "Saint-Martin (partie française)");
        self.add_country("PM", "Saint Pierre and Miquelon", "Saint-Pierre-et-Miquelon");
        self.add_country("VC", "Saint Vincent and the Grenadines", "Saint-Vincent-et-les-Grenadines");
        self.add_country("WS", "Samoa", "Samoa");
        self.add_country("SM", "San Marino", "Saint-Marin");
        self.add_country("ST", "Sao Tome and Principe", "Sao Tomé-et-Principe");
        self.add_country("SA", "Saudi Arabia", "Arabie saoudite");
        self.add_country("SN", "Senegal", "Sénégal");
        self.add_country("RS", "Serbia", "Serbie");
        self.add_country("SC", "Seychelles", "Seychelles");
        self.add_country("SL", "Sierra Leone", "Sierra Leone");
        self.add_country("SG", "Singapore", "Singapour");
        self.add_country("SX", "Sint Maarten (Dutch part)", "Saint-Martin (partie néerlandaise)");
        self.add_country("SK", "Slovakia", "Slovaquie");
        self.add_country("SI", "Slovenia", "Slovénie");
        self.add_country("SB", "Solomon Islands", "Salomon, Îles");
        self.add_country("SO", "Somalia", "Somalie");
        self.add_country("ZA", "South Africa", "Afrique du Sud");
        self.add_country("GS", "South Georgia and the South Sandwich Islands", "Géorgie du Sud-et-les Îles Sandwich du Sud");
        self.add_country("SS", "South Sudan", "Soudan du Sud");
        self.add_country("ES", "Spain", "Espagne");
        self.add_country("LK", "Sri Lanka", "Sri Lanka");
        self.add_country("SD", "Sudan", "Soudan");
        self.add_country("SR", "Suriname", "Suriname");
        self.add_country("SJ", "Svalbard and Jan Mayen", "Svalbard et Île Jan Mayen");
        self.add_country("SE", "Sweden", "Suède");
        self.add_country("CH", "Switzerland", "Suisse");
        self.add_country("SY", "Syrian Arab Republic", "Syrienne, République arabe");
        self.add_country("TW", "Taiwan, Province of China", "Taïwan, Province de Chine");
        self.add_country("TJ", "Tajikistan", "Tadjikistan");
        self.add_country("TZ", "Tanzania, United Republic of", "Tanzanie, République unie de");
        self.add_country("TH", "Thailand", "Thaïlande");
        self.add_country("TL", "Timor-Leste", "Timor-Leste");
        self.add_country("TG", "Togo", "Togo");
        self.add_country("TK", "Tokelau", "Tokelau");
        self.add_country("TO", "Tonga", "Tonga");
        self.add_country("TT", "Trinidad and Tobago", "Trinité-et-Tobago");
        self.add_country("TN", "Tunisia", "Tunisie");
        self.add_country("TR", "Türkiye", "Turquie");
        self.add_country("TM", "Turkmenistan", "Turkménistan");
        self.add_country("TC", "Turks and Caicos Islands", "Turks-et-Caïcos, Îles");
        self.add_country("TV", "Tuvalu", "Tuvalu");
        self.add_country("UG", "Uganda", "Ouganda");
        self.add_country("UA", "Ukraine", "Ukraine");
        self.add_country("AE", "United Arab Emirates", "Émirats arabes unis");
        self.add_country("GB", "United Kingdom", "Royaume-Uni");
        self.add_country("US", "United States", "États-Unis");
        self.add_country("UM", "United States Minor Outlying Islands", "Îles mineures éloignées des États-Unis");
        self.add_country("UY", "Uruguay", "Uruguay");
        self.add_country("UZ", "Uzbekistan", "Ouzbékistan");
        self.add_country("VU", "Vanuatu", "Vanuatu");
        self.add_country("VE", "Venezuela, Bolivarian Republic of", "Venezuela, République bolivarienne du");
        self.add_country("VN", "Viet Nam", "Viêt Nam");
        self.add_country("VG", "Virgin Islands, British", "Îles Vierges britanniques");
        self.add_country("VI", "Virgin Islands, U.S.", "Îles Vierges des États-Unis");
        self.add_country("WF", "Wallis and Futuna", "Wallis-et-Futuna");
        self.add_country("EH", "Western Sahara", "Sahara occidental");
        self.add_country("YE", "Yemen", "Yémen");
        self.add_country("ZM", "Zambia", "Zambie");
        self.add_country("ZW", "Zimbabwe", "Zimbabwe");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_table_covers_iso_3166() {
        let db = CountryDatabase::with_defaults();
        assert_eq!(db.len(), 249);
    }

    #[test]
    fn test_translate_english_name() {
        let db = CountryDatabase::with_defaults();
        assert_eq!(db.translate("Germany"), Some("Allemagne"));
        assert_eq!(db.translate("United States"), Some("États-Unis"));
        assert_eq!(db.translate("Korea, Republic of"), Some("Corée, République de"));
    }

    #[test]
    fn test_translate_by_code() {
        let db = CountryDatabase::with_defaults();
        assert_eq!(db.translate("NL"), Some("Pays-Bas"));
    }

    #[test]
    fn test_miss_degrades_to_identity() {
        let db = CountryDatabase::with_defaults();
        // World Bank spelling is not an ISO short name
        assert_eq!(db.translate("Korea, Rep."), None);
        assert_eq!(db.translate_or_identity("Korea, Rep."), "Korea, Rep.");
        // Lookup is exact
        assert_eq!(db.translate_or_identity("germany"), "germany");
        assert_eq!(db.translate_or_identity(""), "");
    }

    #[test]
    fn test_entry_without_translation() {
        let db = CountryDatabase::from_entries(vec![CountryEntry::new("XK", "Kosovo", None)]);
        assert!(db.get("Kosovo").is_some());
        assert_eq!(db.translate("Kosovo"), None);
        assert_eq!(db.translate_or_identity("Kosovo"), "Kosovo");
    }

    #[test]
    fn test_from_json_file() {
        let json = r#"[
            {"code": "DE", "name": "Germany", "name_fr": "Allemagne"},
            {"code": "XK", "name": "Kosovo"}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let db = CountryDatabase::from_json_file(file.path()).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.translate("Germany"), Some("Allemagne"));
        assert_eq!(db.translate("Kosovo"), None);
    }

    #[test]
    fn test_from_json_file_rejects_empty_table() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let err = CountryDatabase::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ReconcileError::CountryTable(_)));
    }
}
