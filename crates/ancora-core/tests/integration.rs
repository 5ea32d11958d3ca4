use ancora_core::access::RegistryCache;
use ancora_core::config::Config;
use ancora_core::error::{AccessError, ValidationError};
use ancora_core::export::{download_filename, write_jpeg};
use ancora_core::paths;
use ancora_core::render::{BlockKind, Compositor, FontSet, TextRole};
use ancora_core::session::Session;
use ancora_core::types::{Concession, Priority, Profession, Step};
use chrono::NaiveDate;
use tempfile::TempDir;

fn project() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(paths::REGISTRY_FILE),
        "ana@clinica.com,A1B2,2030-12-31\nbruno@exemplo.com,XYZ,2025-12-31\n",
    )
    .unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    (dir, config)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn compositor(config: &Config) -> Compositor {
    Compositor::with_fonts(FontSet::bitmap(), &config.render)
}

// ---------------------------------------------------------------------------
// Full wizard
// ---------------------------------------------------------------------------

#[test]
fn dentist_plan_from_sign_in_to_export() {
    let (dir, config) = project();
    let mut cache = RegistryCache::new(config.registry_path(dir.path()), config.refresh_interval());
    let registry = cache.get().unwrap();

    let mut session = Session::new();
    session
        .sign_in(&registry, "ANA@clinica.com", "A1B2", today())
        .unwrap();

    session
        .commit_step1(
            Profession::from_choice("Dentista"),
            "Clareamento Dental",
            "R$ 1.200,00",
        )
        .unwrap();
    session
        .commit_step2("Kit de Manutenção", "R$ 200,00", "R$ 400,00", "", "")
        .unwrap();

    session.toggle_concession(Concession::Bonus, true);
    session.describe_concession(Concession::Bonus, "10% de bônus em produtos");
    session.prioritize_concession(Concession::Bonus, Priority::First);
    session.commit_step3().unwrap();
    assert_eq!(session.step(), Step::Result);

    let c = compositor(&config);
    let (principal, anchor) = session.offer().completed().unwrap();
    let layout = c.layout(principal, anchor, &session.concessions().ordered_view());
    let cards: Vec<_> = layout.blocks_of(BlockKind::ConcessionCard).collect();
    assert_eq!(cards.len(), 1);
    let badge: Vec<_> = cards[0]
        .texts_with(TextRole::PriorityBadge)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(badge, vec!["1ª"]);

    let image = session.render_summary(&c).unwrap().clone();
    assert_eq!(image.width(), config.render.canvas_width);
    assert_eq!(image.height(), layout.height);

    let out = dir.path().join(download_filename(Profession::Dentist));
    write_jpeg(&image, config.render.jpeg_quality, &out).unwrap();
    assert!(out.ends_with("plano-dentista.jpg"));
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn priority_order_drives_card_order() {
    let (dir, config) = project();
    let mut cache = RegistryCache::new(config.registry_path(dir.path()), config.refresh_interval());
    let registry = cache.get().unwrap();

    let mut session = Session::new();
    session
        .sign_in(&registry, "ana@clinica.com", "A1B2", today())
        .unwrap();
    session
        .commit_step1(Some(Profession::Jeweler), "Anel de Ouro", "R$ 3.000")
        .unwrap();
    session
        .commit_step2("Limpeza", "R$ 50", "R$ 80", "1x", "3x")
        .unwrap();

    session.toggle_concession(Concession::ExtendedWarranty, true);
    session.describe_concession(Concession::ExtendedWarranty, "2 anos");
    session.prioritize_concession(Concession::ExtendedWarranty, Priority::LastResort);
    session.toggle_concession(Concession::Personalization, true);
    session.describe_concession(Concession::Personalization, "gravação");
    session.prioritize_concession(Concession::Personalization, Priority::Second);
    session.commit_step3().unwrap();

    let c = compositor(&config);
    let (principal, anchor) = session.offer().completed().unwrap();
    let layout = c.layout(principal, anchor, &session.concessions().ordered_view());
    let names: Vec<_> = layout
        .blocks_of(BlockKind::ConcessionCard)
        .flat_map(|b| b.texts_with(TextRole::ConcessionName))
        .map(|t| t.text.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            Concession::Personalization.label().to_string(),
            Concession::ExtendedWarranty.label().to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// Access gate
// ---------------------------------------------------------------------------

#[test]
fn expired_credential_keeps_wizard_locked() {
    let (dir, config) = project();
    let mut cache = RegistryCache::new(config.registry_path(dir.path()), config.refresh_interval());
    let registry = cache.get().unwrap();

    let mut session = Session::new();
    assert_eq!(
        session.sign_in(&registry, "bruno@exemplo.com", "XYZ", today()),
        Err(AccessError::Expired)
    );
    assert_eq!(
        session.commit_step1(Some(Profession::Dentist), "a", "b"),
        Err(ValidationError::Locked)
    );
}

#[test]
fn missing_registry_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let mut cache = RegistryCache::new(config.registry_path(dir.path()), config.refresh_interval());
    assert!(matches!(
        cache.get(),
        Err(ancora_core::AncoraError::RegistryUnavailable(_))
    ));
}

// ---------------------------------------------------------------------------
// Restart
// ---------------------------------------------------------------------------

#[test]
fn restart_returns_to_the_access_gate() {
    let (dir, config) = project();
    let mut cache = RegistryCache::new(config.registry_path(dir.path()), config.refresh_interval());
    let registry = cache.get().unwrap();

    let mut session = Session::new();
    session
        .sign_in(&registry, "ana@clinica.com", "A1B2", today())
        .unwrap();
    session
        .commit_step1(Some(Profession::Dentist), "Clareamento", "R$ 1.200")
        .unwrap();
    session.restart();

    assert!(!session.is_authenticated());
    assert_eq!(session.step(), Step::Identification);
    assert!(session.offer().is_empty());

    session
        .sign_in(&registry, "ana@clinica.com", "A1B2", today())
        .unwrap();
    assert!(session.offer().principal.is_none());
}
