use crate::types::Step;
use thiserror::Error;

/// Reasons a sign-in attempt is refused.
///
/// `InvalidCredential` covers both an unknown identity and a wrong code so the
/// gate never reveals which identities exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("e-mail ou código de acesso inválido")]
    InvalidCredential,

    #[error("seu acesso expirou, renove a assinatura para continuar")]
    Expired,

    #[error("data de expiração inválida no cadastro, contate o suporte")]
    MalformedExpiry,
}

/// A step transition that was refused. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("preencha todos os campos para continuar ({})", .fields.join(", "))]
    MissingFields {
        step: Step,
        fields: Vec<&'static str>,
    },

    #[error("selecione pelo menos uma moeda de troca")]
    NoConcessionSelected,

    #[error("etapa {} não está ativa (etapa atual: {})", .expected.number(), .current.number())]
    OutOfSequence { expected: Step, current: Step },

    #[error("faça login para continuar")]
    Locked,
}

#[derive(Debug, Error)]
pub enum AncoraError {
    #[error("cadastro de usuários indisponível, contate o suporte")]
    RegistryUnavailable(#[source] std::io::Error),

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, AncoraError>;
