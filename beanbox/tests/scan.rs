use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use beanbox::{AppConfig, ApplicationContext, BeanComponent, ContainerError, SingletonCreation};

static INITIALIZED: AtomicUsize = AtomicUsize::new(0);

mod app {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use beanbox::{Bean, BeanPostProcessor, Component, PostProcessorComponent};

    use super::INITIALIZED;

    #[derive(Default, Component)]
    pub struct UserRepository;

    impl UserRepository {
        pub fn find_user(&self, id: u64) -> String {
            format!("user-{id}")
        }
    }

    #[derive(Default, Component)]
    #[component(init = "start")]
    pub struct UserService {
        #[autowired]
        pub user_repository: Option<Arc<UserRepository>>,
        pub started: bool,
    }

    impl UserService {
        fn start(&mut self) -> Result<(), String> {
            if self.user_repository.is_none() {
                return Err("repository was not injected".to_string());
            }
            self.started = true;
            Ok(())
        }

        pub fn user_name(&self, id: u64) -> Option<String> {
            self.user_repository.as_ref().map(|repo| repo.find_user(id))
        }
    }

    #[derive(Default, Component)]
    #[component(name = "auditLog", prototype)]
    pub struct AuditLog;

    #[derive(Default, Component)]
    pub struct Checkout {
        #[autowired(name = "auditLog")]
        pub audit: Option<Arc<AuditLog>>,
    }

    struct CountInitialized;

    impl BeanPostProcessor for CountInitialized {
        fn after_initialization(&self, bean: &Bean, _name: &str) -> Option<Bean> {
            INITIALIZED.fetch_add(1, Ordering::SeqCst);
            Some(bean.clone())
        }
    }

    beanbox::inventory::submit! {
        PostProcessorComponent::new(module_path!(), || Arc::new(CountInitialized))
    }
}

mod broken {
    use std::sync::Arc;

    use beanbox::Component;

    use super::app::AuditLog;

    #[derive(Default, Component)]
    pub struct Orphan {
        #[autowired]
        pub missing_thing: Option<Arc<AuditLog>>,
    }
}

mod gateways {
    use std::sync::Arc;

    use beanbox::Component;

    #[derive(Default, Component)]
    pub struct HTTPGateway;

    #[derive(Default, Component)]
    pub struct Billing {
        #[autowired(name = "HTTPGateway")]
        pub gateway: Option<Arc<HTTPGateway>>,
    }
}

fn app_base() -> String {
    format!("{}::app", module_path!())
}

#[test]
fn scanned_components_are_wired() {
    let context = ApplicationContext::scan(&app_base()).unwrap();

    assert_eq!(
        context.bean_names(),
        vec!["auditLog", "checkout", "userRepository", "userService"]
    );

    let service: Arc<app::UserService> = context.get_bean("userService").unwrap();
    let repository: Arc<app::UserRepository> = context.get_bean("userRepository").unwrap();

    assert!(service.started);
    assert!(Arc::ptr_eq(service.user_repository.as_ref().unwrap(), &repository));
    assert_eq!(service.user_name(1).as_deref(), Some("user-1"));
    assert!(INITIALIZED.load(Ordering::SeqCst) >= 2);
}

#[test]
fn prototype_and_named_injection() {
    let context = ApplicationContext::scan(&app_base()).unwrap();

    let first: Arc<app::AuditLog> = context.get_bean("auditLog").unwrap();
    let second: Arc<app::AuditLog> = context.get_bean("auditLog").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    let checkout: Arc<app::Checkout> = context.get_bean("checkout").unwrap();
    assert!(checkout.audit.is_some());
}

#[test]
fn scanned_processor_is_registered() {
    let context = ApplicationContext::scan(&app_base()).unwrap();
    assert_eq!(context.container().post_processor_count(), 1);
}

#[test]
fn exclusive_settings_apply() {
    let config = AppConfig::from_toml_str("[container]\nsingleton_creation = \"exclusive\"").unwrap();
    let context = ApplicationContext::scan_with(&app_base(), &config).unwrap();

    assert_eq!(
        context.container().settings().singleton_creation,
        SingletonCreation::Exclusive
    );
    assert_eq!(context.preinstantiate_singletons().unwrap(), 3);
}

#[test]
fn unresolved_dependency_surfaces_on_retrieval_and_validation() {
    let base = format!("{}::broken", module_path!());
    let context = ApplicationContext::scan(&base).unwrap();

    match context.get_bean_any("orphan") {
        Err(ContainerError::InjectionFailure { bean, attribute, .. }) => {
            assert_eq!(bean, "orphan");
            assert_eq!(attribute, "missing_thing");
        }
        other => panic!("Expected InjectionFailure, got: {other:?}"),
    }

    match context.container().validate() {
        Err(ContainerError::DefinitionNotFound(e)) => {
            assert_eq!(e.name, "missingThing");
            assert_eq!(e.required_by.as_deref(), Some("orphan"));
        }
        other => panic!("Expected DefinitionNotFound, got: {other:?}"),
    }
}

#[test]
fn whole_crate_scan_finds_every_component() {
    let context = ApplicationContext::scan(module_path!()).unwrap();
    assert_eq!(context.bean_names().len(), 7);
}

#[test]
fn registered_name_comes_from_the_component_const() {
    assert_eq!(<app::UserService as BeanComponent>::BEAN_NAME, "userService");
    assert_eq!(<gateways::HTTPGateway as BeanComponent>::BEAN_NAME, "HTTPGateway");

    let context = ApplicationContext::scan(&format!("{}::gateways", module_path!())).unwrap();
    assert_eq!(context.bean_names(), vec!["HTTPGateway", "billing"]);

    let billing: Arc<gateways::Billing> = context.get_bean("billing").unwrap();
    let gateway: Arc<gateways::HTTPGateway> = context.get_bean("HTTPGateway").unwrap();
    assert!(Arc::ptr_eq(billing.gateway.as_ref().unwrap(), &gateway));
}
