pub mod scoped;
pub mod types;

pub use types::GadiParams;

pub mod appointments;
pub mod authentication;
pub mod catalog;
pub mod categories;
pub mod customers;
pub mod employees;
pub mod garages;
pub mod invoices;
pub mod parts;
pub mod suppliers;
pub mod users;
pub mod vehicles;
pub mod work_orders;

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use gadi_auth::{Authenticator, TokenIssuer, UserStore};
use gadi_core::config::ConfigSnapshot;
use gadi_core::resolver::TenancyRules;
use gadi_core::{GadiApp, GadiService};
use gadi_store::{GarageRegistry, ScopedCollection};

use appointments::Appointment;
use catalog::ServiceItem;
use categories::Category;
use customers::Customer;
use employees::Employee;
use invoices::Invoice;
use parts::Part;
use scoped::ScopedCrudService;
use suppliers::Supplier;
use vehicles::Vehicle;
use work_orders::WorkOrder;

/// All shared state: the garage registry (tenant directory), the user
/// store, token machinery, and one guarded collection per tenant-scoped
/// entity.
pub struct ServerState {
    pub registry: Arc<GarageRegistry>,
    pub users: Arc<UserStore>,
    pub authenticator: Arc<Authenticator>,
    pub tokens: Arc<TokenIssuer>,

    pub customers: Arc<ScopedCollection<Customer>>,
    pub employees: Arc<ScopedCollection<Employee>>,
    pub catalog: Arc<ScopedCollection<ServiceItem>>,
    pub vehicles: Arc<ScopedCollection<Vehicle>>,
    pub appointments: Arc<ScopedCollection<Appointment>>,
    pub work_orders: Arc<ScopedCollection<WorkOrder>>,
    pub categories: Arc<ScopedCollection<Category>>,
    pub suppliers: Arc<ScopedCollection<Supplier>>,
    pub parts: Arc<ScopedCollection<Part>>,
    pub invoices: Arc<ScopedCollection<Invoice>>,
}

impl ServerState {
    pub fn new(config: &ConfigSnapshot) -> Self {
        let users = Arc::new(UserStore::new());

        let secret = config
            .get_string("auth.secret")
            .unwrap_or_else(|| "gadisewa-dev-secret".to_string());
        let ttl = config.get_u64("auth.ttl_secs").unwrap_or(3600) as i64;

        Self {
            registry: Arc::new(GarageRegistry::new()),
            authenticator: Arc::new(Authenticator::new(Arc::clone(&users))),
            tokens: Arc::new(TokenIssuer::new(secret, ttl)),
            users,

            customers: Arc::new(ScopedCollection::new("customers")),
            employees: Arc::new(ScopedCollection::new("employees")),
            catalog: Arc::new(ScopedCollection::new("services")),
            vehicles: Arc::new(ScopedCollection::new("vehicles")),
            appointments: Arc::new(ScopedCollection::new("appointments")),
            work_orders: Arc::new(ScopedCollection::new("work-orders")),
            categories: Arc::new(ScopedCollection::new("categories")),
            suppliers: Arc::new(ScopedCollection::new("suppliers")),
            parts: Arc::new(ScopedCollection::new("parts")),
            invoices: Arc::new(ScopedCollection::new("invoices")),
        }
    }
}

type Svc = Arc<dyn GadiService<Value, GadiParams>>;

pub struct GadiServices {
    pub garages: Svc,
    pub authentication: Svc,
    pub users: Svc,
    pub customers: Svc,
    pub employees: Svc,
    pub catalog: Svc,
    pub vehicles: Svc,
    pub appointments: Svc,
    pub work_orders: Svc,
    pub categories: Svc,
    pub suppliers: Svc,
    pub parts: Svc,
    pub invoices: Svc,
}

pub fn configure(
    app: &GadiApp<Value, GadiParams>,
    state: Arc<ServerState>,
    rules: TenancyRules,
) -> Result<GadiServices> {
    let garages: Svc = Arc::new(garages::GaragesService {
        registry: Arc::clone(&state.registry),
        rules,
    });
    app.register_service("garages", Arc::clone(&garages));

    let authentication: Svc = Arc::new(authentication::AuthenticationService {
        authenticator: Arc::clone(&state.authenticator),
        tokens: Arc::clone(&state.tokens),
    });
    app.register_service("authentication", Arc::clone(&authentication));

    let users_svc: Svc = Arc::new(users::UsersService {
        users: Arc::clone(&state.users),
    });
    app.register_service("users", Arc::clone(&users_svc));
    users::users_shared::register_hooks(app)?;

    let employees: Svc = Arc::new(employees::EmployeesService {
        collection: Arc::clone(&state.employees),
        users: Arc::clone(&state.users),
    });
    app.register_service("employees", Arc::clone(&employees));

    let customers: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.customers)));
    app.register_service("customers", Arc::clone(&customers));

    let catalog: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.catalog)));
    app.register_service("services", Arc::clone(&catalog));

    let vehicles: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.vehicles)));
    app.register_service("vehicles", Arc::clone(&vehicles));

    let appointments: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.appointments)));
    app.register_service("appointments", Arc::clone(&appointments));

    let work_orders: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.work_orders)));
    app.register_service("work-orders", Arc::clone(&work_orders));

    let categories: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.categories)));
    app.register_service("categories", Arc::clone(&categories));

    let suppliers: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.suppliers)));
    app.register_service("suppliers", Arc::clone(&suppliers));

    let parts: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.parts)));
    app.register_service("parts", Arc::clone(&parts));

    let invoices: Svc = Arc::new(ScopedCrudService::new(Arc::clone(&state.invoices)));
    app.register_service("invoices", Arc::clone(&invoices));

    Ok(GadiServices {
        garages,
        authentication,
        users: users_svc,
        customers,
        employees,
        catalog,
        vehicles,
        appointments,
        work_orders,
        categories,
        suppliers,
        parts,
        invoices,
    })
}
