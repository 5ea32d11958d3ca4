use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Identification,
    Anchor,
    Concessions,
    Result,
}

impl Step {
    pub const COUNT: u8 = 4;

    pub fn all() -> &'static [Step] {
        &[
            Step::Identification,
            Step::Anchor,
            Step::Concessions,
            Step::Result,
        ]
    }

    /// 1-indexed position shown to the user ("Etapa 2 de 4").
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn next(self) -> Option<Step> {
        Step::all().get(self as usize + 1).copied()
    }

    pub fn previous(self) -> Option<Step> {
        (self as usize)
            .checked_sub(1)
            .and_then(|i| Step::all().get(i).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Identification => "identification",
            Step::Anchor => "anchor",
            Step::Concessions => "concessions",
            Step::Result => "result",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Identification => "Identificação",
            Step::Anchor => "Oferta Âncora",
            Step::Concessions => "Moedas de Troca",
            Step::Result => "Resultado",
        }
    }

    /// Fraction of the wizard reached, for progress bars.
    pub fn progress(self) -> f32 {
        f32::from(self.number()) / f32::from(Step::COUNT)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Profession
// ---------------------------------------------------------------------------

/// Placeholder entry of the profession select box.
pub const PROFESSION_UNSELECTED: &str = "Selecione...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    CivilLawyer,
    CleaningCompany,
    AdvancedAesthetics,
    LanguageSchool,
    GraduateInstitution,
    DistanceLearningHub,
    RealEstateBroker,
    InsuranceBroker,
    Jeweler,
    Videomaker,
    SocialMedia,
    PrepCourseSchool,
    Dentist,
    Orthopedist,
}

impl Profession {
    pub fn all() -> &'static [Profession] {
        &[
            Profession::CivilLawyer,
            Profession::CleaningCompany,
            Profession::AdvancedAesthetics,
            Profession::LanguageSchool,
            Profession::GraduateInstitution,
            Profession::DistanceLearningHub,
            Profession::RealEstateBroker,
            Profession::InsuranceBroker,
            Profession::Jeweler,
            Profession::Videomaker,
            Profession::SocialMedia,
            Profession::PrepCourseSchool,
            Profession::Dentist,
            Profession::Orthopedist,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Profession::CivilLawyer => "Advogado Civil",
            Profession::CleaningCompany => "Empresa de Limpeza",
            Profession::AdvancedAesthetics => "Profissional de Estética Avançada",
            Profession::LanguageSchool => "Escola de Idiomas",
            Profession::GraduateInstitution => "Instituição de Pós-Graduação",
            Profession::DistanceLearningHub => "Polo EAD de Faculdade",
            Profession::RealEstateBroker => "Corretor Imobiliário",
            Profession::InsuranceBroker => "Corretora de Seguros",
            Profession::Jeweler => "Joalheria",
            Profession::Videomaker => "Videomaker",
            Profession::SocialMedia => "Social Media",
            Profession::PrepCourseSchool => "Escola de Cursos Preparatórios",
            Profession::Dentist => "Dentista",
            Profession::Orthopedist => "Ortopedista",
        }
    }

    pub fn from_label(label: &str) -> Option<Profession> {
        Profession::all().iter().copied().find(|p| p.label() == label)
    }

    /// Select-box value to profession. The placeholder and anything off the
    /// list both mean "nothing selected".
    pub fn from_choice(choice: &str) -> Option<Profession> {
        if choice == PROFESSION_UNSELECTED {
            return None;
        }
        Profession::from_label(choice)
    }

    /// Options for the select box, placeholder first.
    pub fn choices() -> Vec<&'static str> {
        std::iter::once(PROFESSION_UNSELECTED)
            .chain(Profession::all().iter().map(|p| p.label()))
            .collect()
    }

    /// Lower-cased label with spaces turned into hyphens.
    pub fn slug(self) -> String {
        self.label().to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Concession
// ---------------------------------------------------------------------------

/// A "currency of exchange": something offered instead of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concession {
    Bonus,
    ExtendedWarranty,
    LoyaltyProgram,
    EasyInstallments,
    PriorityDelivery,
    Personalization,
    ReferralReward,
}

impl Concession {
    pub fn all() -> &'static [Concession] {
        &[
            Concession::Bonus,
            Concession::ExtendedWarranty,
            Concession::LoyaltyProgram,
            Concession::EasyInstallments,
            Concession::PriorityDelivery,
            Concession::Personalization,
            Concession::ReferralReward,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Concession::Bonus => "Bonificação",
            Concession::ExtendedWarranty => "Garantia Estendida",
            Concession::LoyaltyProgram => "Programa de Fidelidade",
            Concession::EasyInstallments => "Parcelamento Facilitado",
            Concession::PriorityDelivery => "Entrega Rápida/Prioritária",
            Concession::Personalization => "Personalização",
            Concession::ReferralReward => "Recompensa por Indicação",
        }
    }

    pub fn from_label(label: &str) -> Option<Concession> {
        Concession::all().iter().copied().find(|c| c.label() == label)
    }
}

impl fmt::Display for Concession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// When a concession should be put on the table, first to last.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    First,
    Second,
    LastResort,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::First, Priority::Second, Priority::LastResort]
    }

    /// Host select-box index to priority. `None` for anything past the end.
    pub fn from_index(index: usize) -> Option<Priority> {
        Priority::all().get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::First => "1ª - Oferecer primeiro",
            Priority::Second => "2ª - Segunda opção",
            Priority::LastResort => "3ª - Último recurso",
        }
    }

    /// Ordinal prefix of the label, e.g. `"1ª"`.
    pub fn badge(self) -> &'static str {
        let label = self.label();
        label.split(" - ").next().unwrap_or(label)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
