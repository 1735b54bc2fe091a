//! Display titles and short descriptions for raw history keys.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::locale::Locale;

static FORM_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,5}$").expect("valid regex"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));

const FORM_PREFIX: &str = "IMM";
const DEFAULT_KEY: &str = "DEFAULT";

const TITLES: &[(Locale, &str, &str)] = &[
    (Locale::English, "INITIAL", "Application Received"),
    (Locale::English, "AOR", "Acknowledgement of Receipt"),
    (Locale::English, "BIOMETRICS", "Biometrics Collection"),
    (Locale::English, "MED_REPORT", "Medical Exam Request"),
    (Locale::English, "MED_RESULT", "Medical Exam Results"),
    (Locale::English, "MED_PROOF", "Medical Exam Proof Received"),
    (Locale::English, "SPR_UNDERTAKING", "Sponsorship Application (IMM 1344)"),
    (Locale::English, "GEN_APPL_FORM", "Generic Application Form (IMM 0008)"),
    (Locale::English, "FAMILY_INFO", "Additional Family Information (IMM 5406)"),
    (Locale::English, "USE_OF_REP", "Use of Representative (IMM 5476)"),
    (Locale::English, "Medical", "Medical Exam Update"),
    (Locale::English, "Biometrics", "Biometrics Update"),
    (Locale::English, "COPR_ISSUED", "Confirmation of Permanent Residence (COPR) Issued"),
    (Locale::English, "DECISION", "Decision Made"),
    (Locale::English, DEFAULT_KEY, "Update"),
    (Locale::French, "INITIAL", "Demande Reçue"),
    (Locale::French, "AOR", "Accusé de Réception"),
    (Locale::French, "BIOMETRICS", "Collecte de Biométrie"),
    (Locale::French, "MED_REPORT", "Demande Examen Médical"),
    (Locale::French, "MED_RESULT", "Résultats Médicaux"),
    (Locale::French, "MED_PROOF", "Preuve Médicale Reçue"),
    (Locale::French, "SPR_UNDERTAKING", "Demande de Parrainage (IMM 1344)"),
    (Locale::French, "GEN_APPL_FORM", "Formulaire Générique (IMM 0008)"),
    (Locale::French, "FAMILY_INFO", "Info Famille (IMM 5406)"),
    (Locale::French, "USE_OF_REP", "Représentant (IMM 5476)"),
    (Locale::French, "Medical", "Mise à jour Médicale"),
    (Locale::French, "Biometrics", "Mise à jour Biométrique"),
    (Locale::French, "COPR_ISSUED", "Confirmation Résidence Permanente (CRP)"),
    (Locale::French, "DECISION", "Décision Prise"),
    (Locale::French, DEFAULT_KEY, "Mise à jour"),
];

const DESCRIPTIONS: &[(Locale, &str, &str)] = &[
    (Locale::English, "INITIAL", "We received your application and are checking completeness."),
    (Locale::English, "AOR", "We have started processing your application."),
    (Locale::English, "BIOMETRICS", "We need your fingerprints and photo."),
    (Locale::English, "MED_REPORT", "You need to complete a medical exam."),
    (Locale::French, "INITIAL", "Nous avons reçu votre demande et vérifions sa conformité."),
    (Locale::French, "AOR", "Nous avons commencé le traitement de votre demande."),
    (Locale::French, "BIOMETRICS", "Nous avons besoin de vos empreintes et photo."),
    (Locale::French, "MED_REPORT", "Vous devez passer un examen médical."),
];

const FORM_LABELS: &[(Locale, &str)] = &[(Locale::English, "Form"), (Locale::French, "Formulaire")];

/// Turns raw history keys into display text for a given locale
#[derive(Debug, Clone)]
pub struct KeyTranslator {
    titles: HashMap<(Locale, &'static str), &'static str>,
    descriptions: HashMap<(Locale, &'static str), &'static str>,
    form_labels: HashMap<Locale, &'static str>,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self {
            titles: TITLES.iter().map(|&(l, k, v)| ((l, k), v)).collect(),
            descriptions: DESCRIPTIONS.iter().map(|&(l, k, v)| ((l, k), v)).collect(),
            form_labels: FORM_LABELS.iter().copied().collect(),
        }
    }

    /// Title for a history key. Known keys come from the table, form
    /// references render as `Form IMM <n>`, anything else is humanized.
    pub fn title_for(&self, key: &str, locale: Locale) -> String {
        if let Some(title) = self.titles.get(&(locale, key)) {
            return (*title).to_string();
        }

        if key.starts_with(FORM_PREFIX) || FORM_NUMBER.is_match(key) {
            let number = key.replace(FORM_PREFIX, "");
            let label = self.form_labels.get(&locale).copied().unwrap_or("Form");
            return format!("{} {} {}", label, FORM_PREFIX, number.trim());
        }

        humanize(key)
    }

    pub fn description_for(&self, key: &str, locale: Locale) -> Option<String> {
        self.descriptions
            .get(&(locale, key))
            .map(|d| (*d).to_string())
    }

    /// Generic "Update" title
    pub fn default_title(&self, locale: Locale) -> String {
        self.title_for(DEFAULT_KEY, locale)
    }
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// `background_check` -> `Background check`. Only the first letter is
/// capitalized.
pub fn humanize(key: &str) -> String {
    capitalize_first(&key.replace('_', " ").to_lowercase())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split camel-case status words, sentence case: `InProgress` -> `In progress`.
pub fn format_status(status: &str) -> String {
    capitalize_first(&CAMEL_BOUNDARY.replace_all(status, "$1 $2").to_lowercase())
}
