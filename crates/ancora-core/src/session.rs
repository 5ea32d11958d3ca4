use crate::access::{normalize_identity, CredentialRegistry};
use crate::concession::{ConcessionRegistry, CountAdvisory};
use crate::config::ConcessionPolicy;
use crate::error::{AccessError, ValidationError};
use crate::offer::{AnchorOffer, OfferRecord, PrincipalOffer};
use crate::render::Compositor;
use crate::types::{Concession, Priority, Profession, Step};
use chrono::NaiveDate;
use image::RgbImage;
use serde::{Deserialize, Serialize};

type StepResult = std::result::Result<(), ValidationError>;

// ---------------------------------------------------------------------------
// WizardView
// ---------------------------------------------------------------------------

/// What the host needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardView {
    pub step: Step,
    pub step_number: u8,
    pub step_count: u8,
    pub step_label: String,
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<CountAdvisory>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's pass through the wizard. Owned by the host and passed to every
/// action; nothing here is shared between sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
    #[serde(default)]
    step: Step,
    #[serde(default)]
    offer: OfferRecord,
    #[serde(default)]
    concessions: ConcessionRegistry,
    #[serde(skip)]
    rendered_image: Option<RgbImage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn offer(&self) -> &OfferRecord {
        &self.offer
    }

    pub fn concessions(&self) -> &ConcessionRegistry {
        &self.concessions
    }

    pub fn rendered_image(&self) -> Option<&RgbImage> {
        self.rendered_image.as_ref()
    }

    pub fn view(&self, policy: &ConcessionPolicy) -> WizardView {
        let advisory = match self.step {
            Step::Concessions | Step::Result => self.concessions.advisory(policy),
            _ => None,
        };
        WizardView {
            step: self.step,
            step_number: self.step.number(),
            step_count: Step::COUNT,
            step_label: self.step.label().to_string(),
            progress: self.step.progress(),
            advisory,
        }
    }

    // -----------------------------------------------------------------------
    // Access gate
    // -----------------------------------------------------------------------

    pub fn sign_in(
        &mut self,
        registry: &CredentialRegistry,
        identity: &str,
        code: &str,
        today: NaiveDate,
    ) -> std::result::Result<(), AccessError> {
        registry.authenticate(identity, code, today)?;
        self.authenticated = true;
        self.identity = Some(normalize_identity(identity));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Forward transitions
    // -----------------------------------------------------------------------

    /// Step 1: profession, principal offer name and price, all required.
    /// `None` is the unselected placeholder.
    pub fn commit_step1(
        &mut self,
        profession: Option<Profession>,
        offer_name: &str,
        offer_price: &str,
    ) -> StepResult {
        self.expect_step(Step::Identification)?;

        let mut missing = Vec::new();
        if profession.is_none() {
            missing.push("profissão");
        }
        if offer_name.is_empty() {
            missing.push("oferta principal");
        }
        if offer_price.is_empty() {
            missing.push("preço da oferta principal");
        }
        let Some(profession) = profession.filter(|_| missing.is_empty()) else {
            return Err(self.reject(Step::Identification, missing));
        };

        self.offer.principal = Some(PrincipalOffer {
            profession,
            name: offer_name.to_string(),
            price: offer_price.to_string(),
        });
        self.advance();
        Ok(())
    }

    /// Step 2: anchor name and price bounds are required; installment
    /// bounds may be empty.
    pub fn commit_step2(
        &mut self,
        anchor_name: &str,
        price_min: &str,
        price_max: &str,
        installments_min: &str,
        installments_max: &str,
    ) -> StepResult {
        self.expect_step(Step::Anchor)?;

        let mut missing = Vec::new();
        if anchor_name.is_empty() {
            missing.push("oferta âncora");
        }
        if price_min.is_empty() {
            missing.push("preço mínimo");
        }
        if price_max.is_empty() {
            missing.push("preço máximo");
        }
        if !missing.is_empty() {
            return Err(self.reject(Step::Anchor, missing));
        }

        self.offer.anchor = Some(AnchorOffer {
            name: anchor_name.to_string(),
            price_min: price_min.to_string(),
            price_max: price_max.to_string(),
            installments_min: installments_min.to_string(),
            installments_max: installments_max.to_string(),
        });
        self.advance();
        Ok(())
    }

    /// Step 3: at least one selected concession must be described.
    pub fn commit_step3(&mut self) -> StepResult {
        self.expect_step(Step::Concessions)?;

        if self.concessions.described_count() == 0 {
            tracing::debug!(selected = self.concessions.len(), "step 3 rejected: no described concession");
            return Err(ValidationError::NoConcessionSelected);
        }
        self.advance();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Backward / restart
    // -----------------------------------------------------------------------

    /// Go back one step. Never fails and keeps everything already entered.
    pub fn back(&mut self) -> Step {
        if let Some(previous) = self.step.previous() {
            tracing::debug!(from = %self.step, to = %previous, "wizard step back");
            self.step = previous;
        }
        self.step
    }

    /// Throw the whole session away, sign-in included.
    pub fn restart(&mut self) {
        tracing::info!(identity = ?self.identity, "wizard restarted");
        *self = Self::new();
    }

    // -----------------------------------------------------------------------
    // Concessions
    // -----------------------------------------------------------------------

    pub fn toggle_concession(&mut self, concession: Concession, selected: bool) {
        self.concessions.toggle_selection(concession, selected);
        self.rendered_image = None;
    }

    pub fn describe_concession(&mut self, concession: Concession, text: impl Into<String>) -> bool {
        let changed = self.concessions.set_description(concession, text);
        if changed {
            self.rendered_image = None;
        }
        changed
    }

    pub fn prioritize_concession(&mut self, concession: Concession, priority: Priority) -> bool {
        let changed = self.concessions.set_priority(concession, priority);
        if changed {
            self.rendered_image = None;
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Result
    // -----------------------------------------------------------------------

    /// Compose the summary image for the result step, reusing the cached
    /// copy until the data changes.
    pub fn render_summary(
        &mut self,
        compositor: &Compositor,
    ) -> std::result::Result<&RgbImage, ValidationError> {
        self.expect_step(Step::Result)?;
        let Some((principal, anchor)) = self.offer.completed() else {
            return Err(ValidationError::OutOfSequence {
                expected: Step::Result,
                current: self.step,
            });
        };

        let image = match self.rendered_image.take() {
            Some(cached) => cached,
            None => {
                let image =
                    compositor.compose(principal, anchor, &self.concessions.ordered_view());
                tracing::info!(
                    width = image.width(),
                    height = image.height(),
                    concessions = self.concessions.len(),
                    "summary image rendered"
                );
                image
            }
        };
        let image: &RgbImage = self.rendered_image.insert(image);
        Ok(image)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn expect_step(&self, expected: Step) -> StepResult {
        if !self.authenticated {
            return Err(ValidationError::Locked);
        }
        if self.step != expected {
            return Err(ValidationError::OutOfSequence {
                expected,
                current: self.step,
            });
        }
        Ok(())
    }

    fn reject(&self, step: Step, fields: Vec<&'static str>) -> ValidationError {
        tracing::debug!(step = %step, fields = ?fields, "step rejected: missing fields");
        ValidationError::MissingFields { step, fields }
    }

    fn advance(&mut self) {
        self.rendered_image = None;
        if let Some(next) = self.step.next() {
            tracing::debug!(from = %self.step, to = %next, "wizard step committed");
            self.step = next;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::render::FontSet;

    fn registry() -> CredentialRegistry {
        CredentialRegistry::parse("ana@clinica.com,A1B2,2030-12-31\nvelho@x.com,V1,2020-01-01\n")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn signed_in() -> Session {
        let mut session = Session::new();
        session
            .sign_in(&registry(), "Ana@Clinica.com ", "A1B2", today())
            .unwrap();
        session
    }

    fn at_step3() -> Session {
        let mut session = signed_in();
        session
            .commit_step1(Some(Profession::Dentist), "Clareamento Dental", "R$ 1.200,00")
            .unwrap();
        session
            .commit_step2("Kit de Manutenção", "R$ 200,00", "R$ 400,00", "", "")
            .unwrap();
        session
    }

    fn at_result() -> Session {
        let mut session = at_step3();
        session.toggle_concession(Concession::Bonus, true);
        session.describe_concession(Concession::Bonus, "10% de bônus em produtos");
        session.commit_step3().unwrap();
        session
    }

    fn compositor() -> Compositor {
        Compositor::with_fonts(FontSet::bitmap(), &RenderConfig::default())
    }

    #[test]
    fn new_session_starts_locked_at_step1() {
        let session = Session::new();
        assert_eq!(session.step(), Step::Identification);
        assert!(!session.is_authenticated());
        assert!(session.offer().is_empty());
        assert!(session.concessions().is_empty());
        assert!(session.rendered_image().is_none());
    }

    #[test]
    fn sign_in_records_normalized_identity() {
        let session = signed_in();
        assert!(session.is_authenticated());
        assert_eq!(session.identity(), Some("ana@clinica.com"));
    }

    #[test]
    fn failed_sign_in_leaves_session_locked() {
        let mut session = Session::new();
        assert_eq!(
            session.sign_in(&registry(), "velho@x.com", "V1", today()),
            Err(AccessError::Expired)
        );
        assert!(!session.is_authenticated());
        assert!(session.identity().is_none());
    }

    #[test]
    fn commits_require_sign_in() {
        let mut session = Session::new();
        assert_eq!(
            session.commit_step1(Some(Profession::Dentist), "a", "b"),
            Err(ValidationError::Locked)
        );
        assert_eq!(session.step(), Step::Identification);
    }

    #[test]
    fn step1_missing_fields_do_not_mutate() {
        let mut session = signed_in();
        let err = session
            .commit_step1(None, "Clareamento Dental", "")
            .unwrap_err();
        match err {
            ValidationError::MissingFields { step, fields } => {
                assert_eq!(step, Step::Identification);
                assert_eq!(fields, vec!["profissão", "preço da oferta principal"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.step(), Step::Identification);
        assert!(session.offer().principal.is_none());
    }

    #[test]
    fn step1_accepts_any_non_empty_price() {
        let mut session = signed_in();
        session
            .commit_step1(Some(Profession::Jeweler), "Anel", "a combinar")
            .unwrap();
        assert_eq!(session.step(), Step::Anchor);
        assert_eq!(session.offer().principal.as_ref().unwrap().price, "a combinar");
    }

    #[test]
    fn step2_installments_are_optional_and_prices_unordered() {
        let mut session = signed_in();
        session
            .commit_step1(Some(Profession::Dentist), "Clareamento", "R$ 1.200")
            .unwrap();
        session
            .commit_step2("Kit", "R$ 900", "R$ 100", "", "")
            .unwrap();
        assert_eq!(session.step(), Step::Concessions);
        let anchor = session.offer().anchor.as_ref().unwrap();
        assert_eq!(anchor.price_min, "R$ 900");
        assert_eq!(anchor.installments_max, "");
    }

    #[test]
    fn step2_missing_fields_do_not_mutate() {
        let mut session = signed_in();
        session
            .commit_step1(Some(Profession::Dentist), "Clareamento", "R$ 1.200")
            .unwrap();
        assert!(matches!(
            session.commit_step2("", "R$ 200", "R$ 400", "2x", "6x"),
            Err(ValidationError::MissingFields { step: Step::Anchor, .. })
        ));
        assert_eq!(session.step(), Step::Anchor);
        assert!(session.offer().anchor.is_none());
    }

    #[test]
    fn steps_cannot_be_skipped() {
        let mut session = signed_in();
        assert_eq!(
            session.commit_step3(),
            Err(ValidationError::OutOfSequence {
                expected: Step::Concessions,
                current: Step::Identification,
            })
        );
        assert!(session
            .commit_step2("Kit", "R$ 200", "R$ 400", "", "")
            .is_err());
        assert_eq!(session.step(), Step::Identification);
    }

    #[test]
    fn step3_requires_a_described_concession() {
        let mut session = at_step3();
        assert_eq!(session.commit_step3(), Err(ValidationError::NoConcessionSelected));

        session.toggle_concession(Concession::Bonus, true);
        assert_eq!(session.commit_step3(), Err(ValidationError::NoConcessionSelected));
        assert_eq!(session.step(), Step::Concessions);

        session.describe_concession(Concession::Bonus, "brinde");
        session.commit_step3().unwrap();
        assert_eq!(session.step(), Step::Result);
    }

    #[test]
    fn back_keeps_later_data() {
        let mut session = at_result();
        assert_eq!(session.back(), Step::Concessions);
        assert_eq!(session.back(), Step::Anchor);
        assert_eq!(session.back(), Step::Identification);
        assert_eq!(session.back(), Step::Identification);

        assert!(session.offer().completed().is_some());
        assert!(session.concessions().is_selected(Concession::Bonus));
    }

    #[test]
    fn recommitting_step1_replaces_values() {
        let mut session = at_step3();
        session.back();
        session.back();
        session
            .commit_step1(Some(Profession::Orthopedist), "Palmilha", "R$ 500")
            .unwrap();
        let principal = session.offer().principal.as_ref().unwrap();
        assert_eq!(principal.profession, Profession::Orthopedist);
        assert_eq!(session.offer().anchor.as_ref().unwrap().name, "Kit de Manutenção");
    }

    #[test]
    fn restart_clears_everything() {
        let mut session = at_result();
        session.render_summary(&compositor()).unwrap();
        session.restart();

        assert_eq!(session.step(), Step::Identification);
        assert!(session.offer().is_empty());
        assert!(session.concessions().is_empty());
        assert!(session.rendered_image().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn render_summary_only_on_result_step() {
        let mut session = at_step3();
        assert!(matches!(
            session.render_summary(&compositor()),
            Err(ValidationError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn render_summary_caches_until_data_changes() {
        let c = compositor();
        let mut session = at_result();
        let first = session.render_summary(&c).unwrap().clone();
        assert!(session.rendered_image().is_some());

        session.toggle_concession(Concession::ExtendedWarranty, true);
        assert!(session.rendered_image().is_none());
        let second = session.render_summary(&c).unwrap();
        assert!(second.height() > first.height());
    }

    #[test]
    fn setters_on_unselected_concession_keep_cache() {
        let c = compositor();
        let mut session = at_result();
        session.render_summary(&c).unwrap();
        assert!(!session.describe_concession(Concession::Personalization, "x"));
        assert!(!session.prioritize_concession(Concession::Personalization, Priority::Second));
        assert!(session.rendered_image().is_some());
    }

    #[test]
    fn view_reports_progress_and_advisory() {
        let policy = ConcessionPolicy::default();
        let session = signed_in();
        let view = session.view(&policy);
        assert_eq!(view.step_number, 1);
        assert_eq!(view.step_label, "Identificação");
        assert!(view.advisory.is_none());

        let mut session = at_step3();
        let view = session.view(&policy);
        assert_eq!(view.step, Step::Concessions);
        assert!(matches!(view.advisory, Some(CountAdvisory::TooFew { .. })));

        for &c in &Concession::all()[..4] {
            session.toggle_concession(c, true);
        }
        let view = session.view(&policy);
        assert_eq!(
            view.advisory,
            Some(CountAdvisory::TooMany { selected: 4, max: 3 })
        );
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"kind\":\"too_many\""));
    }

    #[test]
    fn session_serializes_without_image() {
        let mut session = at_result();
        session.render_summary(&compositor()).unwrap();
        let yaml = serde_yaml::to_string(&session).unwrap();
        let parsed: Session = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.step(), Step::Result);
        assert_eq!(parsed.offer(), session.offer());
        assert_eq!(parsed.concessions(), session.concessions());
        assert!(parsed.rendered_image().is_none());
    }
}
