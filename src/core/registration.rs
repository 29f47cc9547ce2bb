use crate::domain::model::{DocumentFile, DocumentSlot, RegistrationDraft, UserAccount};
use crate::domain::ports::RegistrationSubmitter;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{
    check_password, is_valid_email, is_valid_phone, password_strength, PasswordStrength,
};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    PersonalInfo,
    DocumentInfo,
    DocumentUploads,
    Address,
    SecurityCredentials,
    Consent,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Self::PersonalInfo,
        Self::DocumentInfo,
        Self::DocumentUploads,
        Self::Address,
        Self::SecurityCredentials,
        Self::Consent,
    ];

    /// 1-based position in the wizard.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PersonalInfo => "Información Personal",
            Self::DocumentInfo => "Documento de Identidad",
            Self::DocumentUploads => "Documentos",
            Self::Address => "Dirección",
            Self::SecurityCredentials => "Información de Seguridad",
            Self::Consent => "Términos y Condiciones",
        }
    }

    pub fn following(&self) -> Option<Step> {
        Self::ALL.get(self.number()).copied()
    }

    pub fn preceding(&self) -> Option<Step> {
        (*self as usize).checked_sub(1).map(|i| Self::ALL[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Name,
    Email,
    Phone,
    BirthDate,
    DocumentType,
    DocumentNumber,
    DocumentFront,
    DocumentBack,
    SelfieWithDocument,
    Address,
    City,
    Department,
    Password,
    ConfirmPassword,
    SecurityQuestion,
    SecurityAnswer,
    AcceptTerms,
    AcceptDataTreatment,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::BirthDate => "birthDate",
            Self::DocumentType => "documentType",
            Self::DocumentNumber => "documentNumber",
            Self::DocumentFront => "documentFront",
            Self::DocumentBack => "documentBack",
            Self::SelfieWithDocument => "selfieWithDocument",
            Self::Address => "address",
            Self::City => "city",
            Self::Department => "department",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::SecurityQuestion => "securityQuestion",
            Self::SecurityAnswer => "securityAnswer",
            Self::AcceptTerms => "acceptTerms",
            Self::AcceptDataTreatment => "acceptDataTreatment",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type FieldErrors = BTreeMap<DraftField, String>;

fn require_text(errors: &mut FieldErrors, field: DraftField, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
        return false;
    }
    true
}

fn require_choice(errors: &mut FieldErrors, field: DraftField, value: &str, message: &str) {
    if value.is_empty() {
        errors.insert(field, message.to_string());
    }
}

/// A present file must still satisfy its slot's type and size rules, however
/// it got into the draft.
fn require_file(
    errors: &mut FieldErrors,
    field: DraftField,
    slot: DocumentSlot,
    file: &Option<DocumentFile>,
    message: &str,
) {
    match file {
        None => {
            errors.insert(field, message.to_string());
        }
        Some(file) => {
            if let Err(e) = slot.check(file) {
                errors.insert(field, e.user_friendly_message());
            }
        }
    }
}

/// Checks only the rules owned by `step`; other steps are never looked at.
pub fn validate_step(step: Step, draft: &RegistrationDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match step {
        Step::PersonalInfo => {
            require_text(&mut errors, DraftField::Name, &draft.name, "El nombre es requerido");
            if require_text(&mut errors, DraftField::Email, &draft.email, "El email es requerido")
                && !is_valid_email(&draft.email)
            {
                errors.insert(DraftField::Email, "Email inválido".to_string());
            }
            if require_text(&mut errors, DraftField::Phone, &draft.phone, "El teléfono es requerido")
                && !is_valid_phone(&draft.phone)
            {
                errors.insert(DraftField::Phone, "Teléfono debe tener 10 dígitos".to_string());
            }
            require_choice(
                &mut errors,
                DraftField::BirthDate,
                &draft.birth_date,
                "La fecha de nacimiento es requerida",
            );
        }
        Step::DocumentInfo => {
            require_choice(
                &mut errors,
                DraftField::DocumentType,
                &draft.document_type,
                "El tipo de documento es requerido",
            );
            require_text(
                &mut errors,
                DraftField::DocumentNumber,
                &draft.document_number,
                "El número de documento es requerido",
            );
        }
        Step::DocumentUploads => {
            require_file(
                &mut errors,
                DraftField::DocumentFront,
                DocumentSlot::Front,
                &draft.document_front,
                "La foto frontal es requerida",
            );
            require_file(
                &mut errors,
                DraftField::DocumentBack,
                DocumentSlot::Back,
                &draft.document_back,
                "La foto trasera es requerida",
            );
            require_file(
                &mut errors,
                DraftField::SelfieWithDocument,
                DocumentSlot::Selfie,
                &draft.selfie_with_document,
                "La selfie con documento es requerida",
            );
        }
        Step::Address => {
            require_text(&mut errors, DraftField::Address, &draft.address, "La dirección es requerida");
            require_choice(&mut errors, DraftField::City, &draft.city, "La ciudad es requerida");
            require_choice(
                &mut errors,
                DraftField::Department,
                &draft.department,
                "El departamento es requerido",
            );
        }
        Step::SecurityCredentials => {
            if let Err(issue) = check_password(&draft.password) {
                errors.insert(DraftField::Password, issue.message().to_string());
            }
            if draft.confirm_password.is_empty() {
                errors.insert(DraftField::ConfirmPassword, "Confirma tu contraseña".to_string());
            } else if draft.password != draft.confirm_password {
                errors.insert(
                    DraftField::ConfirmPassword,
                    "Las contraseñas no coinciden".to_string(),
                );
            }
            require_choice(
                &mut errors,
                DraftField::SecurityQuestion,
                &draft.security_question,
                "Selecciona una pregunta de seguridad",
            );
            require_text(
                &mut errors,
                DraftField::SecurityAnswer,
                &draft.security_answer,
                "La respuesta es requerida",
            );
        }
        Step::Consent => {
            if !draft.accept_terms {
                errors.insert(
                    DraftField::AcceptTerms,
                    "Debes aceptar los términos y condiciones".to_string(),
                );
            }
            if !draft.accept_data_treatment {
                errors.insert(
                    DraftField::AcceptDataTreatment,
                    "Debes aceptar el tratamiento de datos".to_string(),
                );
            }
        }
    }

    errors
}

#[derive(Debug)]
pub enum StepOutcome {
    /// The active step passed and the wizard moved to this step.
    Advanced(Step),
    /// The active step failed; see `RegistrationWizard::errors`.
    Invalid,
    /// A submission is already in flight; nothing was sent.
    Pending,
    Submitted(UserAccount),
    /// The submitter rejected the draft. Step and draft are kept for a retry.
    Failed(MarketError),
}

/// Six-step registration form: holds the draft, the active step and the
/// field errors of the last validation.
#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    draft: RegistrationDraft,
    step: Step,
    errors: FieldErrors,
    /// Set for the duration of a submission; an interrupted submission
    /// leaves it set until the caller clears it.
    busy: bool,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::with_draft(RegistrationDraft::default())
    }

    pub fn with_draft(draft: RegistrationDraft) -> Self {
        Self {
            draft,
            step: Step::PersonalInfo,
            errors: FieldErrors::new(),
            busy: false,
        }
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RegistrationDraft {
        &mut self.draft
    }

    pub fn into_draft(self) -> RegistrationDraft {
        self.draft
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Strength meter for the password typed so far; `None` while empty.
    pub fn password_strength(&self) -> Option<PasswordStrength> {
        if self.draft.password.is_empty() {
            None
        } else {
            Some(password_strength(&self.draft.password))
        }
    }

    pub fn attach_document(&mut self, slot: DocumentSlot, file: DocumentFile) -> Result<()> {
        slot.check(&file)?;
        let target = match slot {
            DocumentSlot::Front => &mut self.draft.document_front,
            DocumentSlot::Back => &mut self.draft.document_back,
            DocumentSlot::Selfie => &mut self.draft.selfie_with_document,
        };
        *target = Some(file);
        Ok(())
    }

    pub fn previous(&mut self) -> Step {
        if let Some(step) = self.step.preceding() {
            self.step = step;
            self.errors.clear();
        }
        self.step
    }

    /// Validates the active step and moves forward. From the last step the
    /// whole draft goes to `submitter` exactly once; earlier steps are not
    /// re-checked at that point.
    pub async fn next<S>(&mut self, submitter: &S) -> StepOutcome
    where
        S: RegistrationSubmitter + ?Sized,
    {
        self.errors = validate_step(self.step, &self.draft);
        if !self.errors.is_empty() {
            tracing::debug!(
                step = self.step.number(),
                fields = ?self.errors.keys().map(DraftField::as_str).collect::<Vec<_>>(),
                "registration step rejected"
            );
            return StepOutcome::Invalid;
        }

        if let Some(step) = self.step.following() {
            self.step = step;
            return StepOutcome::Advanced(step);
        }

        if self.busy {
            return StepOutcome::Pending;
        }

        tracing::info!("Submitting registration for {}", self.draft.email);
        self.busy = true;
        let result = submitter.register(&self.draft).await;
        self.busy = false;
        match result {
            Ok(user) => StepOutcome::Submitted(user),
            Err(e) => {
                tracing::warn!("Registration submission failed: {}", e);
                StepOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccountStatus, Role, MAX_DOCUMENT_BYTES};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingSubmitter {
        calls: AtomicUsize,
        received: Mutex<Option<RegistrationDraft>>,
        fail_with: Option<String>,
    }

    impl RecordingSubmitter {
        fn accepting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                received: Mutex::new(None),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl RegistrationSubmitter for RecordingSubmitter {
        async fn register(&self, draft: &RegistrationDraft) -> Result<UserAccount> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.received.lock().unwrap() = Some(draft.clone());
            if let Some(message) = &self.fail_with {
                return Err(MarketError::api(Some(400), message.clone()));
            }
            Ok(UserAccount {
                id: "7".to_string(),
                first_names: draft.name.clone(),
                last_names: String::new(),
                document_type: draft.document_type.clone(),
                document_number: draft.document_number.clone(),
                email: draft.email.clone(),
                phone: draft.phone.clone(),
                birth_date: draft.birth_date.clone(),
                role: Role::Requester,
                account_status: AccountStatus::Unverified,
                address: Some(draft.address.clone()),
                city: Some(draft.city.clone()),
                department: Some(draft.department.clone()),
                postal_code: None,
                accepted_terms: true,
                accepted_data_treatment: true,
                receives_notifications: false,
            })
        }
    }

    fn image(name: &str) -> DocumentFile {
        DocumentFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 200_000,
        }
    }

    fn complete_draft() -> RegistrationDraft {
        RegistrationDraft {
            name: "Juan Pérez García".to_string(),
            email: "juan@correo.com".to_string(),
            phone: "300 123 4567".to_string(),
            birth_date: "1990-04-12".to_string(),
            document_type: "CC".to_string(),
            document_number: "1234567890".to_string(),
            document_front: Some(image("front.jpg")),
            document_back: Some(image("back.jpg")),
            selfie_with_document: Some(image("selfie.jpg")),
            address: "Calle 123 #45-67".to_string(),
            city: "Medellín".to_string(),
            department: "Antioquia".to_string(),
            password: "Segura123".to_string(),
            confirm_password: "Segura123".to_string(),
            security_question: "mascota".to_string(),
            security_answer: "Firulais".to_string(),
            accept_terms: true,
            accept_data_treatment: true,
            ..RegistrationDraft::default()
        }
    }

    #[tokio::test]
    async fn test_complete_draft_submits_exactly_once() {
        let submitter = RecordingSubmitter::accepting();
        let mut wizard = RegistrationWizard::with_draft(complete_draft());

        for expected in &Step::ALL[1..] {
            match wizard.next(&submitter).await {
                StepOutcome::Advanced(step) => assert_eq!(step, *expected),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);

        let outcome = wizard.next(&submitter).await;
        assert!(matches!(outcome, StepOutcome::Submitted(_)));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            submitter.received.lock().unwrap().as_ref(),
            Some(&complete_draft())
        );
    }

    #[tokio::test]
    async fn test_missing_fields_block_advancement() {
        let submitter = RecordingSubmitter::accepting();
        let mut wizard = RegistrationWizard::new();
        wizard.draft_mut().email = "no-es-email".to_string();
        wizard.draft_mut().phone = "123".to_string();

        let outcome = wizard.next(&submitter).await;

        assert!(matches!(outcome, StepOutcome::Invalid));
        assert_eq!(wizard.current_step(), Step::PersonalInfo);
        let errors = wizard.errors();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[&DraftField::Name], "El nombre es requerido");
        assert_eq!(errors[&DraftField::Email], "Email inválido");
        assert_eq!(errors[&DraftField::Phone], "Teléfono debe tener 10 dígitos");
        assert!(errors.contains_key(&DraftField::BirthDate));
    }

    #[test]
    fn test_password_mismatch_fails_step_five() {
        let mut draft = complete_draft();
        draft.confirm_password = "Segura124".to_string();
        let errors = validate_step(Step::SecurityCredentials, &draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&DraftField::ConfirmPassword], "Las contraseñas no coinciden");
    }

    #[test]
    fn test_password_without_symbol_is_accepted() {
        let draft = complete_draft();
        assert!(validate_step(Step::SecurityCredentials, &draft).is_empty());
        let wizard = RegistrationWizard::with_draft(draft);
        assert_eq!(wizard.password_strength(), Some(PasswordStrength::Medium));
    }

    #[test]
    fn test_uploads_require_all_three_files() {
        let mut draft = complete_draft();
        draft.document_back = None;
        draft.selfie_with_document = None;
        let errors = validate_step(Step::DocumentUploads, &draft);
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![DraftField::DocumentBack, DraftField::SelfieWithDocument]
        );
    }

    #[tokio::test]
    async fn test_uploads_recheck_files_placed_directly_in_draft() {
        let submitter = RecordingSubmitter::accepting();
        let mut draft = complete_draft();
        draft.document_front = Some(DocumentFile {
            file_name: "setup.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
            size_bytes: 1_024,
        });
        draft.selfie_with_document = Some(DocumentFile {
            file_name: "selfie.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: MAX_DOCUMENT_BYTES + 1,
        });
        let mut wizard = RegistrationWizard::with_draft(draft);
        wizard.next(&submitter).await;
        wizard.next(&submitter).await;
        assert_eq!(wizard.current_step(), Step::DocumentUploads);

        assert!(matches!(wizard.next(&submitter).await, StepOutcome::Invalid));
        assert_eq!(wizard.current_step(), Step::DocumentUploads);
        let errors = wizard.errors();
        assert_eq!(
            errors[&DraftField::DocumentFront],
            "Formato no permitido: application/x-msdownload"
        );
        assert_eq!(
            errors[&DraftField::SelfieWithDocument],
            "El archivo supera el tamaño máximo de 5MB"
        );
        assert!(!errors.contains_key(&DraftField::DocumentBack));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_consent_requires_both_flags_but_not_notifications() {
        let mut draft = complete_draft();
        draft.receive_notifications = false;
        assert!(validate_step(Step::Consent, &draft).is_empty());
        draft.accept_data_treatment = false;
        assert!(validate_step(Step::Consent, &draft).contains_key(&DraftField::AcceptDataTreatment));
    }

    #[tokio::test]
    async fn test_previous_clears_errors_and_stops_at_first_step() {
        let submitter = RecordingSubmitter::accepting();
        let mut wizard = RegistrationWizard::with_draft(complete_draft());
        wizard.next(&submitter).await;
        wizard.draft_mut().document_number.clear();
        assert!(matches!(wizard.next(&submitter).await, StepOutcome::Invalid));
        assert!(!wizard.errors().is_empty());

        assert_eq!(wizard.previous(), Step::PersonalInfo);
        assert!(wizard.errors().is_empty());
        assert_eq!(wizard.previous(), Step::PersonalInfo);
    }

    #[tokio::test]
    async fn test_busy_flag_suppresses_resubmission() {
        let submitter = RecordingSubmitter::accepting();
        let mut wizard = RegistrationWizard::with_draft(complete_draft());
        for _ in 0..5 {
            wizard.next(&submitter).await;
        }
        wizard.set_busy(true);

        assert!(matches!(wizard.next(&submitter).await, StepOutcome::Pending));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    struct StalledSubmitter;

    #[async_trait]
    impl RegistrationSubmitter for StalledSubmitter {
        async fn register(&self, _draft: &RegistrationDraft) -> Result<UserAccount> {
            std::future::pending::<Result<UserAccount>>().await
        }
    }

    #[tokio::test]
    async fn test_wizard_is_busy_while_submission_is_in_flight() {
        let mut wizard = RegistrationWizard::with_draft(complete_draft());
        for _ in 0..5 {
            wizard.next(&StalledSubmitter).await;
        }
        assert!(!wizard.is_busy());

        let stalled = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            wizard.next(&StalledSubmitter),
        )
        .await;
        assert!(stalled.is_err());
        assert!(wizard.is_busy());

        let submitter = RecordingSubmitter::accepting();
        assert!(matches!(wizard.next(&submitter).await, StepOutcome::Pending));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);

        wizard.set_busy(false);
        assert!(matches!(wizard.next(&submitter).await, StepOutcome::Submitted(_)));
        assert!(!wizard.is_busy());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_final_step() {
        let submitter = RecordingSubmitter::failing("Email ya registrado");
        let mut wizard = RegistrationWizard::with_draft(complete_draft());
        for _ in 0..5 {
            wizard.next(&submitter).await;
        }

        match wizard.next(&submitter).await {
            StepOutcome::Failed(e) => assert_eq!(e.user_friendly_message(), "Email ya registrado"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(wizard.current_step(), Step::Consent);
        assert_eq!(wizard.draft(), &complete_draft());
    }

    #[test]
    fn test_attach_document_checks_slot_rules() {
        let mut wizard = RegistrationWizard::new();
        let pdf = DocumentFile {
            file_name: "selfie.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 10,
        };
        assert!(wizard.attach_document(DocumentSlot::Selfie, pdf.clone()).is_err());
        assert!(wizard.draft().selfie_with_document.is_none());
        assert!(wizard.attach_document(DocumentSlot::Front, pdf).is_ok());
        assert!(wizard.draft().document_front.is_some());
    }
}
