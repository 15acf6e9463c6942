//! Tree assembler tests: row ordering, parent links, levels, child flags,
//! and appointment display titles.

use std::sync::Arc;

use uuid::Uuid;

use orgchart_core::domain::{NodeKind, SalaryFrequency};
use orgchart_core::services::{
    HierarchyService, NewDepartment, NewOrgChart, NewPosition, TreeService,
};
use orgchart_infrastructure::{MemoryHierarchyStore, MemoryUserDirectory};

struct Harness {
    engine: HierarchyService<MemoryHierarchyStore>,
    tree: TreeService<MemoryHierarchyStore, MemoryUserDirectory>,
    directory: Arc<MemoryUserDirectory>,
    company: Uuid,
}

fn setup() -> Harness {
    let store = Arc::new(MemoryHierarchyStore::new());
    let directory = Arc::new(MemoryUserDirectory::new());
    Harness {
        engine: HierarchyService::new(store.clone()),
        tree: TreeService::new(store, directory.clone()),
        directory,
        company: Uuid::new_v4(),
    }
}

fn department(org_chart_id: Uuid, title: &str, code: &str) -> NewDepartment {
    NewDepartment {
        org_chart_id,
        title: title.to_string(),
        description: None,
        code: code.to_string(),
        headcount: 10,
        parent_department_id: None,
    }
}

fn position(org_chart_id: Uuid, department_id: Uuid, title: &str) -> NewPosition {
    NewPosition {
        org_chart_id,
        department_id,
        title: title.to_string(),
        description: None,
        salary_min: 40_000,
        salary_max: 60_000,
        salary_currency: "USD".to_string(),
        salary_frequency: SalaryFrequency::Annual,
        reports_to_position_id: None,
    }
}

#[tokio::test]
async fn assembles_depth_first_with_parent_links_and_levels() {
    let h = setup();
    let chart = h
        .engine
        .create_org_chart(h.company, NewOrgChart { title: "Main".into(), description: None }, None)
        .await
        .unwrap();

    let finance = h
        .engine
        .create_department(h.company, department(chart.id, "Finance", "FIN"), None)
        .await
        .unwrap();
    let mut accounting = department(chart.id, "Accounting", "ACC");
    accounting.parent_department_id = Some(finance.department.id);
    let accounting = h.engine.create_department(h.company, accounting, None).await.unwrap();
    let people = h
        .engine
        .create_department(h.company, department(chart.id, "People", "HR"), None)
        .await
        .unwrap();

    let rows = h.tree.assemble(h.company, chart.id).await.unwrap();

    // Chart first, then the finance subtree in full (its head position was
    // created before the accounting sub-department, so it sorts first),
    // then people.
    let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Main",
            "Finance",
            "Head of Finance",
            "Vacant",
            "Accounting",
            "Head of Accounting",
            "Vacant",
            "People",
            "Head of People",
            "Vacant",
        ]
    );

    // Root row.
    assert_eq!(rows[0].kind, NodeKind::OrgChart);
    assert_eq!(rows[0].parent_id, None);
    assert_eq!(rows[0].level, 0);
    assert!(rows[0].has_children);

    // Top-level departments hang off the chart at level 0.
    assert_eq!(rows[1].parent_id, Some(chart.id));
    assert_eq!(rows[1].level, 0);
    assert!(rows[1].has_children);

    // The nested department links to its parent department.
    let acc_row = rows.iter().find(|r| r.title == "Accounting").unwrap();
    assert_eq!(acc_row.parent_id, Some(finance.department.id));
    assert_eq!(acc_row.level, 1);

    // Positions link to their department, appointments to their position.
    assert_eq!(rows[2].parent_id, Some(finance.department.id));
    assert_eq!(rows[2].level, 1);
    assert_eq!(rows[3].parent_id, Some(finance.head_position.id));
    assert_eq!(rows[3].level, 2);

    let head_of_acc = rows.iter().find(|r| r.title == "Head of Accounting").unwrap();
    assert_eq!(head_of_acc.parent_id, Some(accounting.department.id));
    assert_eq!(head_of_acc.level, 2);

    let people_row = rows.iter().find(|r| r.title == "People").unwrap();
    assert_eq!(people_row.parent_id, Some(chart.id));
    assert_eq!(people_row.id, people.department.id);

    // Siblings are ordered by creation.
    assert!(rows[1].sort_order < people_row.sort_order);
}

#[tokio::test]
async fn appointment_rows_show_member_names_or_vacant() {
    let h = setup();
    let chart = h
        .engine
        .create_org_chart(h.company, NewOrgChart { title: "Main".into(), description: None }, None)
        .await
        .unwrap();
    let finance = h
        .engine
        .create_department(h.company, department(chart.id, "Finance", "FIN"), None)
        .await
        .unwrap();

    let named = Uuid::new_v4();
    h.directory.insert(named, "Jane Cooper").await;
    h.engine.appoint_user(h.company, finance.appointment.id, named, None).await.unwrap();

    // A member the directory cannot resolve still never renders as vacant.
    let unknown = Uuid::new_v4();
    let extra = h
        .engine
        .create_position(h.company, position(chart.id, finance.department.id, "Analyst"), None)
        .await
        .unwrap();
    h.engine.appoint_user(h.company, extra.appointment.id, unknown, None).await.unwrap();

    let rows = h.tree.assemble(h.company, chart.id).await.unwrap();
    let appointment_titles: Vec<&str> = rows
        .iter()
        .filter(|r| r.kind == NodeKind::Appointment)
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(appointment_titles, vec!["Jane Cooper", unknown.to_string().as_str()]);
}

#[tokio::test]
async fn tolerates_partially_populated_charts() {
    let h = setup();
    let chart = h
        .engine
        .create_org_chart(h.company, NewOrgChart { title: "Main".into(), description: None }, None)
        .await
        .unwrap();

    // A bare chart renders as a single childless row.
    let rows = h.tree.assemble(h.company, chart.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].has_children);

    // A department stripped of its positions still appears.
    let finance = h
        .engine
        .create_department(h.company, department(chart.id, "Finance", "FIN"), None)
        .await
        .unwrap();
    h.engine.delete_position(h.company, finance.head_position.id).await.unwrap();

    let rows = h.tree.assemble(h.company, chart.id).await.unwrap();
    let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Main", "Finance"]);
    let finance_row = &rows[1];
    assert!(!finance_row.has_children);
}

#[tokio::test]
async fn positions_and_subdepartments_interleave_by_creation_order() {
    let h = setup();
    let chart = h
        .engine
        .create_org_chart(h.company, NewOrgChart { title: "Main".into(), description: None }, None)
        .await
        .unwrap();
    let finance = h
        .engine
        .create_department(h.company, department(chart.id, "Finance", "FIN"), None)
        .await
        .unwrap();

    // Order of creation under finance: head position (implicit), analyst
    // position, accounting sub-department, auditor position.
    h.engine
        .create_position(h.company, position(chart.id, finance.department.id, "Analyst"), None)
        .await
        .unwrap();
    let mut accounting = department(chart.id, "Accounting", "ACC");
    accounting.parent_department_id = Some(finance.department.id);
    h.engine.create_department(h.company, accounting, None).await.unwrap();
    h.engine
        .create_position(h.company, position(chart.id, finance.department.id, "Auditor"), None)
        .await
        .unwrap();

    let rows = h.tree.assemble(h.company, chart.id).await.unwrap();
    let finance_children: Vec<&str> = rows
        .iter()
        .filter(|r| r.parent_id == Some(finance.department.id))
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(
        finance_children,
        vec!["Head of Finance", "Analyst", "Accounting", "Auditor"]
    );
}
