//! Principal model -> entity mapper

use pulse_core::{Principal, PrincipalId};

use crate::models::PrincipalModel;

impl From<PrincipalModel> for Principal {
    fn from(model: PrincipalModel) -> Self {
        Principal {
            id: PrincipalId::new(model.id),
            handle: model.handle,
            display_name: model.display_name,
            is_online: model.is_online,
            last_seen: model.last_seen,
        }
    }
}
