//! Domain services (business logic)

pub mod hierarchy_service;
pub mod lifecycle_service;
pub mod tree_service;

mod locks;

pub(crate) use locks::ScopeLocks;

pub use hierarchy_service::{
    AppointmentUpdate, DepartmentBundle, DepartmentUpdate, HierarchyService, NewAppointment,
    NewDepartment, NewOrgChart, NewPosition, OrgChartUpdate, PositionBundle, PositionUpdate,
};
pub use lifecycle_service::LifecycleService;
pub use tree_service::{TreeRow, TreeService};
