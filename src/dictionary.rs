//! Static explanations for status codes and event keys.
//!
//! The table is plain data: English and French status words, raw event
//! keys, `IMM NNNN` form keys, bare form numbers and the short numeric
//! tracker codes all live in one string key space. Lookup is exact first,
//! then case-insensitive. There is no substring matching here; callers that
//! need to pull a form number out of a longer key do that before asking.

use std::collections::HashMap;

use tracing::warn;

/// Anything that can explain a status code
pub trait ExplanationSource: Send + Sync {
    fn explain(&self, code: &str) -> Option<String>;
}

const ENTRIES: &[(&str, &str)] = &[
    // Medical
    ("Medical Passed", "Great news! IRCC has received and approved your medical exam results. You meet the health requirements."),
    ("Passed", "The assessment for this section has been successfully completed and approved."),
    ("Medical Completed", "Your medical exam results have been processed."),
    ("Medical In Progress", "IRCC is currently reviewing your medical exam results."),
    ("Biometrics Completed", "Your fingerprints and photo have been received and added to your file."),
    ("Biometrics Exempt", "You do not need to provide biometrics for this application."),
    // Background / security
    ("Background Verification Not Started", "Security checks haven't begun yet. This is normal; they often happen last."),
    ("Background Verification In Progress", "IRCC is verifying your history (criminality, security). This is usually the longest step."),
    ("Background Check Completed", "Security and background screening is finished. You are very close to a decision!"),
    ("Security Screening", "A detailed check by partners (CBSA/CSIS) to ensure admissibility."),
    // Eligibility
    ("Eligibility Review Required", "An officer needs to manually review your file to confirm you meet the programs requirements."),
    ("Eligibility Passed", "You met the core requirements for the program (e.g., points, work experience)."),
    ("Eligibility In Progress", "An officer is actively calculating your eligibility (points, requirements)."),
    // Application status
    ("Application Received", "IRCC has your application and is checking if it is complete (R10 check)."),
    ("AOR", "Acknowledgement of Receipt: IRCC has officially opened your file."),
    ("Ghost Update", "A background update happened (often a system sync) with no visible change. Usually means 'someone touched your file'."),
    // Decision
    ("Decision Made", "A final decision has been reached. Watch your email/account for the official letter."),
    ("PPR", "Passport Request: The 'Golden Email'! IRCC is asking for your passport to issue the visa/COPR."),
    ("COPR", "Confirmation of Permanent Residence: Your document proving you are approved as a permanent resident."),
    ("Refused", "Unfortunately, the application was denied. You will receive a letter explaining why."),
    ("Withdrawn", "The application was cancelled by you or by IRCC."),
    // Numeric tracker codes
    ("54", "Your biometrics information has been successfully received."),
    ("47", "Your medical exam results have been received."),
    ("42", "The background check for your application has started."),
    ("86", "A security screening for your application is in progress."),
    ("9", "Your application has moved to the final decision stage."),
    ("5", "Your application is currently being processed."),
    ("57", "Your biometrics information has been successfully received (System Update)."),
    ("873", "Your eligibility assessment is currently being reviewed."),
    // IMM forms and documents
    ("Formulaire IMM 5756", "Biometrics Instruction Letter. You need to give fingerprints."),
    ("Formulaire IMM 5794", "Acknowledgement of Receipt (AOR). Official start of processing."),
    ("IMM 5756", "Biometrics Instruction Letter. You need to give fingerprints."),
    ("IMM 5794", "Acknowledgement of Receipt (AOR). Official start of processing."),
    ("IMM 5406", "Additional Family Information Request."),
    ("IMM 5669", "Schedule A: Background / Declaration Request."),
    ("IMM 5257", "Application for Visitor Visa / Temporary Resident Visa."),
    ("IMM 5476", "Use of Representative Form update."),
    ("IMM 1017", "Medical Examination Report Instructions."),
    ("IMM 5801", "Passport Request (PPR) or Visa Issuance."),
    // French / bilingual
    ("Mise à jour Médicale", "Statut médical mis à jour / Medical status updated."),
    ("Demande Reçue", "Application officielle reçue dans le système."),
    ("Reçue", "Application received. IRCC is checking for completeness."),
    ("En cours", "In progress. IRCC is reviewing your application."),
    ("Fermée", "Closed. A final decision has been made (Approved/Refused/Withdrawn)."),
    ("Non commencé", "Not started. Review for this section hasn't begun."),
    ("En attente", "Waiting on you. IRCC needs more info/docs."),
    ("Terminé", "Completed. Review for this section is finished."),
    ("Exempt", "Exempted. You don't need to complete this."),
    ("Refusée", "Refused. Application denied."),
    ("Retirée", "Withdrawn. Application cancelled by you or IRCC."),
    ("Abandonnée", "Abandoned. Application closed due to lack of response."),
    ("Vérification des antécédents", "Background Check. Security/Criminality check in progress."),
    ("Admissibilité", "Eligibility. Checking if you meet program requirements."),
    ("Examen médical", "Medical Exam. Health review."),
    ("Biométrie", "Biometrics. Fingerprints and photo."),
    ("Statut de la demande", "Application Status."),
    // Raw event keys
    ("Medical", "Great news! IRCC has received and approved your medical exam results."),
    ("Biometrics", "Your fingerprints and photo have been received."),
    ("AOR", "Acknowledgement of Receipt. Official start of processing."),
    ("INITIAL", "Application received. IRCC is checking for completeness."),
    ("DECISION", "A final decision has been reached. Watch for email."),
    ("MED_RESULT", "Your medical exam results have been processed."),
    ("MED_PROOF", "Proof of medical exam received."),
    ("SPR_UNDERTAKING", "Sponsorship Application (IMM 1344) status."),
    ("GEN_APPL_FORM", "Generic Application Form (IMM 0008) status."),
    ("FAMILY_INFO", "Additional Family Information (IMM 5406) request."),
    ("USE_OF_REP", "Representative (IMM 5476) update."),
    ("COPR_ISSUED", "Congratulations! Confirmation of Permanent Residence issued."),
    // Bare IMM numbers
    ("5756", "Biometrics Instruction Letter. You need to give fingerprints."),
    ("5794", "Acknowledgement of Receipt (AOR). Official start of processing."),
    ("5406", "Additional Family Information Request."),
    ("5669", "Schedule A: Background / Declaration Request."),
    ("5257", "Application for Visitor Visa / Temporary Resident Visa."),
    ("5476", "Use of Representative Form update."),
    ("1017", "Medical Examination Report Instructions."),
    ("5801", "Passport Request (PPR) or Visa Issuance."),
    ("1344", "Application to Sponsor, Sponsorship Agreement and Undertaking."),
    ("0008", "Generic Application Form for Canada."),
    ("5791", "Temporary Resident Visa (TRV) application check."),
    ("10003", "Pre-arrival services info / Employment strategy letter."),
    ("10002", "Pre-arrival services info / Settlement services letter."),
    ("5787", "Express Entry Profile: Confirmation of eligibility."),
    ("5786", "Express Entry Profile: Creation confirmation."),
    ("IMM 5791", "Temporary Resident Visa (TRV) application check."),
    ("IMM 10003", "Pre-arrival services info / Employment strategy letter."),
    ("IMM 10002", "Pre-arrival services info / Settlement services letter."),
    ("IMM 5787", "Express Entry Profile: Confirmation of eligibility."),
    ("IMM 5786", "Express Entry Profile: Creation confirmation."),
    // Common English
    ("Waived", "Exempted. This requirement does not apply to you."),
    ("Cancelled", "IRCC had to recreate your application due to an error."),
    ("Delayed", "More time is needed to review your application."),
    ("Waiting on you", "Action required from you (e.g., submit docs)."),
    ("In progress", "Currently being reviewed by an officer."),
    ("Completed", "This step is finished."),
    ("Exempted", "Requirement waived for your case."),
    ("Met", "Requirement fulfilled."),
    ("Not Met", "Requirement not fulfilled."),
    ("Review Required", "Complex case flag. An officer must manually assess a specific document or claim."),
    ("Invitation to Apply", "You have been selected from the pool and can now submit your full application."),
];

/// Lookup table from status codes to human-readable explanations
#[derive(Debug, Clone)]
pub struct StatusDictionary {
    exact: HashMap<String, String>,
    /// lowercase key -> key as first listed
    folded: HashMap<String, String>,
    duplicates: Vec<String>,
}

impl StatusDictionary {
    /// Dictionary over the built-in table
    pub fn new() -> Self {
        Self::from_entries(ENTRIES.iter().copied())
    }

    /// Build from arbitrary entries. Repeated keys keep the last value and
    /// are reported through `duplicates()`.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        let mut duplicates = Vec::new();

        for (key, explanation) in entries {
            if exact.insert(key.to_string(), explanation.to_string()).is_some() {
                warn!(key, "status dictionary key defined more than once, keeping last entry");
                duplicates.push(key.to_string());
            }
            folded
                .entry(key.to_lowercase())
                .or_insert_with(|| key.to_string());
        }

        Self {
            exact,
            folded,
            duplicates,
        }
    }

    /// Exact match, then case-insensitive match on the trimmed code.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        if let Some(explanation) = self.exact.get(code) {
            return Some(explanation.as_str());
        }

        self.folded
            .get(&code.trim().to_lowercase())
            .and_then(|key| self.exact.get(key))
            .map(String::as_str)
    }

    /// Numeric codes share the string key space
    pub fn lookup_code(&self, code: i64) -> Option<&str> {
        self.lookup(&code.to_string())
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// All definitions, sorted by key
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<_> = self
            .exact
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }
}

impl Default for StatusDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationSource for StatusDictionary {
    fn explain(&self, code: &str) -> Option<String> {
        self.lookup(code).map(str::to_string)
    }
}
