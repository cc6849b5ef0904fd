//! Tests for local-mode paging, filtering and selection through the grid.

use datagrid_lib::Grid;
use datagrid_lib::GridConfig;
use datagrid_lib::Outcome;
use datagrid_lib::identity::RowId;
use datagrid_lib::identity::identify;
use datagrid_lib::model::Record;
use datagrid_lib::query::Action;
use datagrid_lib::query::Direction;
use datagrid_lib::query::FilterSpec;
use datagrid_lib::selection::Modifiers;
use datagrid_lib::selection::SelectionMode;

fn numbers(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|i| Record::new().set("id", i).set("label", format!("item {}", 6 - i)))
        .collect()
}

fn grid(page_size: usize) -> Grid {
    let config = GridConfig::default()
        .with_id_field("id")
        .with_page_size(page_size)
        .with_selection_mode(SelectionMode::Multi);
    let mut grid = Grid::new(config).unwrap();
    grid.load(numbers(5)).unwrap();
    grid
}

fn page_ids(grid: &Grid) -> Vec<String> {
    grid.page_rows().rows.iter().map(|(id, _)| id.to_string()).collect()
}

fn ids(values: &[&str]) -> Vec<RowId> {
    values.iter().map(|v| RowId::from(*v)).collect()
}

#[tokio::test]
async fn test_pages_of_five_rows() {
    let mut grid = grid(2);
    assert_eq!(page_ids(&grid), vec!["1", "2"]);

    grid.dispatch(Action::SetPage(3)).await.unwrap();
    assert_eq!(page_ids(&grid), vec!["5"]);

    grid.dispatch(Action::SetPage(4)).await.unwrap();
    assert_eq!(grid.state().page(), 3);
    assert_eq!(page_ids(&grid), vec!["5"]);
}

#[tokio::test]
async fn test_filter_to_nothing_then_clear() {
    let mut grid = grid(2);
    grid.dispatch(Action::SetPage(2)).await.unwrap();

    let outcome = grid
        .dispatch(Action::filter("id", FilterSpec::gt(99)))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Local { view_changed: true });
    assert_eq!(grid.state().page(), 1);
    assert_eq!(grid.total_pages(), 1);
    assert!(grid.page_rows().is_empty());

    grid.dispatch(Action::ClearFilter("id".to_string())).await.unwrap();
    assert_eq!(grid.total_rows(), 5);
    assert_eq!(grid.total_pages(), 3);
}

#[tokio::test]
async fn test_shift_then_ctrl_click() {
    let mut grid = grid(10);
    grid.click(1, Modifiers::NONE);
    grid.click(4, Modifiers::RANGE);
    assert_eq!(grid.selected(), ids(&["2", "3", "4", "5"]));

    grid.click(2, Modifiers::TOGGLE);
    assert_eq!(grid.selected(), ids(&["2", "4", "5"]));
    let anchor = grid.selection().anchor().cloned().unwrap();
    assert!(grid.selected().contains(&anchor));
}

#[tokio::test]
async fn test_identity_is_stable_across_sort() {
    let mut grid = grid(10);
    let before = grid.record_at(3).map(|(id, record)| (id.clone(), record.clone())).unwrap();
    grid.click(3, Modifiers::NONE);

    grid.dispatch(Action::sort("label", Direction::Asc)).await.unwrap();
    let position = grid.buffer().position_of(&before.0).unwrap();
    assert_eq!(position, 1);
    assert_eq!(identify(&before.1, Some("id")), before.0);

    grid.click(position, Modifiers::TOGGLE);
    assert!(grid.selected().is_empty());
    grid.click(position, Modifiers::TOGGLE);
    assert_eq!(grid.selected(), vec![before.0]);
}

#[tokio::test]
async fn test_reload_keeps_operation_state() {
    let mut grid = grid(2);
    grid.dispatch(Action::search("item 1")).await.unwrap();
    assert_eq!(page_ids(&grid), vec!["5"]);

    grid.reload().await.unwrap();
    assert_eq!(grid.state().search(), "item 1");
    assert_eq!(grid.total_rows(), 1);
}

#[tokio::test]
async fn test_rejected_action_changes_nothing() {
    let mut grid = grid(2);
    grid.dispatch(Action::SetPage(2)).await.unwrap();

    assert!(grid.dispatch(Action::SetPageSize(0)).await.is_err());
    assert_eq!(grid.state().page(), 2);
    assert_eq!(grid.state().page_size(), 2);
}

#[test]
fn test_load_clears_selection() {
    let mut grid = grid(10);
    grid.select_all();
    assert_eq!(grid.selection().len(), 5);

    grid.load(numbers(3)).unwrap();
    assert!(grid.selected().is_empty());
    assert_eq!(grid.total_rows(), 3);
}
