//! Component scanning example: two beans discovered by module path, one
//! injected into the other.

use std::sync::Arc;

use beanbox::logging::{self, LogSettings};
use beanbox::{ApplicationContext, Component, Result};

// === Components ===

#[derive(Default, Component)]
pub struct UserRepository;

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        format!("User {{ id: {id}, name: \"user-{id}\" }}")
    }
}

#[derive(Default, Component)]
#[component(init = "ready")]
pub struct UserService {
    #[autowired]
    user_repository: Option<Arc<UserRepository>>,
}

impl UserService {
    fn ready(&mut self) {
        tracing::info!("UserService is ready");
    }

    fn user_name(&self, id: u64) -> String {
        match &self.user_repository {
            Some(repository) => format!("user-{id} via {}", repository.find_user(id)),
            None => "no repository".to_string(),
        }
    }
}

fn main() -> Result<()> {
    let _ = logging::init(&LogSettings {
        filter: "debug".to_string(),
        ..LogSettings::default()
    });

    let context = ApplicationContext::scan(module_path!())?;

    let user_service: Arc<UserService> = context.get_bean("userService")?;
    let user_repository: Arc<UserRepository> = context.get_bean("userRepository")?;

    println!("{}", user_service.user_name(1));
    println!("{}", user_repository.find_user(1));

    Ok(())
}
