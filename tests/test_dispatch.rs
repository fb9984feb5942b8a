use rat_menutree::dropdown::{DropdownChain, DropdownToggle};
use rat_menutree::event::{Dispatch, MenuOutcome};
use rat_menutree::item::menu_tree;
use rat_menutree::resolve::{DIVIDER_CLASS, SUBMENU_CLASS};
use rat_menutree::{
    ActionError, ActionHandler, ActionRef, BindTarget, BoundAction, FnHandler, MenuBarState,
    MenuClick, MenuError, MenuItem, NodeAttr, Record, RecordWatch,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Recorder {
    bound: RefCell<Vec<(Vec<usize>, String)>>,
    clicked: Rc<RefCell<Vec<String>>>,
}

impl ActionHandler for Recorder {
    fn handler(&self, target: &BindTarget, action: &ActionRef) -> Box<dyn BoundAction> {
        self.bound
            .borrow_mut()
            .push((target.path.clone(), action.to_string()));
        Box::new(Recorded {
            action: action.clone(),
            clicked: self.clicked.clone(),
        })
    }
}

struct Recorded {
    action: ActionRef,
    clicked: Rc<RefCell<Vec<String>>>,
}

impl Debug for Recorded {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorded")
            .field("action", &self.action)
            .finish()
    }
}

impl BoundAction for Recorded {
    fn on_click(&self, _record: Option<&Record>) -> Result<(), ActionError> {
        if self.action.as_str() == "fail.action" {
            return Err("action failed".into());
        }
        self.clicked.borrow_mut().push(self.action.to_string());
        Ok(())
    }
}

fn key(path: &[usize]) -> MenuClick {
    MenuClick::key(path)
}

#[test]
fn file_menu_scenario() -> Result<(), anyhow::Error> {
    let exit = Rc::new(Cell::new(0));
    let exit2 = exit.clone();

    let menus = menu_tree([MenuItem::new()
        .title("File")
        .item(MenuItem::new().title("Open").action("open.action"))
        .item(MenuItem::new())
        .item(MenuItem::new().title("Exit").click(move |_| exit2.set(exit2.get() + 1)))]);

    let rec = Rc::new(Recorder::default());
    let handler: Rc<dyn ActionHandler> = rec.clone();
    let mut state = MenuBarState::new(menus, Some(handler));

    let file = state.node(&[0]).expect("file");
    assert!(file.is_submenu());
    assert_eq!(file.css_class(), Some(SUBMENU_CLASS));
    assert_eq!(file.children().len(), 3);
    assert!(state.node(&[0, 0]).expect("open").is_bound());
    assert_eq!(
        state.node(&[0, 1]).expect("divider").css_class(),
        Some(DIVIDER_CLASS)
    );
    assert!(!state.node(&[0, 2]).expect("exit").is_bound());

    // open the dropdown
    assert_eq!(
        state.click_path(&[0], &key(&[0]))?,
        MenuOutcome::Activated(Dispatch::SubMenu)
    );
    assert!(state.is_open(&[0]));
    assert!(rec.clicked.borrow().is_empty());

    // action
    assert_eq!(
        state.click_path(&[0, 0], &key(&[0, 0]))?,
        MenuOutcome::Activated(Dispatch::Action)
    );
    assert_eq!(*rec.clicked.borrow(), vec!["open.action".to_string()]);
    assert!(!state.is_open(&[0]));

    // divider does nothing
    state.click_path(&[0], &key(&[0]))?;
    assert_eq!(
        state.click_path(&[0, 1], &key(&[0, 1]))?,
        MenuOutcome::Activated(Dispatch::Inert)
    );
    assert!(state.is_open(&[0]));
    assert_eq!(exit.get(), 0);
    assert_eq!(rec.clicked.borrow().len(), 1);

    // callback
    assert_eq!(
        state.click_path(&[0, 2], &key(&[0, 2]))?,
        MenuOutcome::Activated(Dispatch::Click)
    );
    assert_eq!(exit.get(), 1);
    assert_eq!(rec.clicked.borrow().len(), 1);
    assert!(!state.is_open(&[0]));

    Ok(())
}

#[test]
fn action_wins_over_click() -> Result<(), anyhow::Error> {
    let clicked = Rc::new(Cell::new(false));
    let clicked2 = clicked.clone();

    let menus = menu_tree([MenuItem::new().title("Edit").item(
        MenuItem::new()
            .title("Copy")
            .action("copy.action")
            .click(move |_| clicked2.set(true)),
    )]);
    let rec = Rc::new(Recorder::default());
    let mut state = MenuBarState::new(menus, Some(rec.clone() as Rc<dyn ActionHandler>));

    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Action));
    assert!(!clicked.get());
    assert_eq!(*rec.clicked.borrow(), vec!["copy.action".to_string()]);
    Ok(())
}

#[test]
fn submenu_header_never_dispatches() -> Result<(), anyhow::Error> {
    let clicked = Rc::new(Cell::new(false));
    let clicked2 = clicked.clone();

    let menus = menu_tree([MenuItem::new()
        .title("File")
        .action("file.action")
        .click(move |_| clicked2.set(true))
        .item(MenuItem::new().title("Open"))]);
    let rec = Rc::new(Recorder::default());
    let mut state = MenuBarState::new(menus, Some(rec.clone() as Rc<dyn ActionHandler>));

    assert!(state.node(&[0]).expect("file").is_bound());
    assert_eq!(
        *rec.bound.borrow(),
        vec![(vec![0], "file.action".to_string())]
    );
    for _ in 0..3 {
        let r = state.click_path(&[0], &key(&[0]))?;
        assert_eq!(r, MenuOutcome::Activated(Dispatch::SubMenu));
    }
    assert!(!clicked.get());
    assert!(rec.clicked.borrow().is_empty());
    Ok(())
}

#[test]
fn handler_is_shared_by_all_levels() {
    let menus = menu_tree([
        MenuItem::new().title("File").item(
            MenuItem::new()
                .title("Recent")
                .item(MenuItem::new().title("More").item(MenuItem::new().title("a.txt").action("open.a"))),
        ),
        MenuItem::new()
            .title("Help")
            .item(MenuItem::new().title("About").action("about")),
    ]);
    let rec = Rc::new(Recorder::default());
    let handler: Rc<dyn ActionHandler> = rec.clone();
    let state = MenuBarState::new(menus, Some(handler.clone()));

    assert!(Rc::ptr_eq(state.handler().expect("handler"), &handler));
    assert_eq!(
        *rec.bound.borrow(),
        vec![
            (vec![0, 0, 0, 0], "open.a".to_string()),
            (vec![1, 0], "about".to_string()),
        ]
    );
    assert_eq!(state.node(&[0, 0, 0, 0]).expect("node").level(), 3);
}

#[test]
fn binding_happens_once() -> Result<(), anyhow::Error> {
    let menus = menu_tree([MenuItem::new()
        .title("File")
        .item(MenuItem::new().title("Open").action("open.action"))]);
    let rec = Rc::new(Recorder::default());
    let mut state = MenuBarState::new(menus, Some(rec.clone() as Rc<dyn ActionHandler>));

    for _ in 0..5 {
        state.click_path(&[0, 0], &key(&[0, 0]))?;
    }
    assert_eq!(rec.bound.borrow().len(), 1);
    assert_eq!(rec.clicked.borrow().len(), 5);
    Ok(())
}

#[test]
fn failed_action_leaves_dropdowns() -> Result<(), anyhow::Error> {
    let menus = menu_tree([MenuItem::new()
        .title("File")
        .item(MenuItem::new().title("Broken").action("fail.action"))]);
    let rec = Rc::new(Recorder::default());
    let mut state = MenuBarState::new(menus, Some(rec.clone() as Rc<dyn ActionHandler>));

    state.click_path(&[0], &key(&[0]))?;
    assert!(state.is_open(&[0]));

    match state.click_path(&[0, 0], &key(&[0, 0])) {
        Err(MenuError::Action { action, source }) => {
            assert_eq!(action.as_str(), "fail.action");
            assert_eq!(source.to_string(), "action failed");
        }
        r => panic!("unexpected {:?}", r),
    }
    assert!(state.is_open(&[0]));

    // still usable
    let r = state.click_path(&[0], &key(&[0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::SubMenu));
    assert!(!state.is_open(&[0]));
    Ok(())
}

/// Toggle that logs all registrations and toggles.
#[derive(Debug, Default)]
struct LoggedToggle {
    chain: DropdownChain,
    registered: Rc<RefCell<Vec<Vec<usize>>>>,
    toggled: Rc<RefCell<Vec<Vec<usize>>>>,
}

impl DropdownToggle for LoggedToggle {
    fn register(&mut self, path: &[usize]) {
        self.registered.borrow_mut().push(path.to_vec());
        self.chain.register(path);
    }

    fn is_registered(&self, path: &[usize]) -> bool {
        self.chain.is_registered(path)
    }

    fn toggle(&mut self, path: &[usize]) -> bool {
        self.toggled.borrow_mut().push(path.to_vec());
        self.chain.toggle(path)
    }

    fn collapse(&mut self) -> bool {
        self.chain.collapse()
    }

    fn is_open(&self, path: &[usize]) -> bool {
        self.chain.is_open(path)
    }

    fn open_path(&self) -> Vec<usize> {
        self.chain.open_path()
    }

    fn restore(&mut self, path: &[usize]) {
        self.chain.restore(path)
    }
}

#[test]
fn toggle_wiring_once() -> Result<(), anyhow::Error> {
    let menus = menu_tree([
        MenuItem::new()
            .title("File")
            .item(MenuItem::new().title("Recent").item(MenuItem::new().title("a.txt"))),
        MenuItem::new().title("Edit").item(MenuItem::new().title("Copy")),
        MenuItem::new().title("Quit"),
    ]);
    let toggle = LoggedToggle::default();
    let registered = toggle.registered.clone();
    let toggled = toggle.toggled.clone();
    let mut state = MenuBarState::new(menus, None).with_toggle(toggle);
    assert!(!state.is_wired());
    assert!(registered.borrow().is_empty());

    state.click_path(&[1], &key(&[1]))?;
    assert!(state.is_wired());
    assert_eq!(*registered.borrow(), vec![vec![0], vec![0, 0], vec![1]]);
    assert!(state.dropdown_toggle().is_registered(&[0, 0]));
    assert!(!state.dropdown_toggle().is_registered(&[2]));

    state.click_path(&[0], &key(&[0]))?;
    state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert!(state.is_open(&[0, 0]));
    assert!(!state.is_open(&[1]));
    assert_eq!(registered.borrow().len(), 3);
    assert_eq!(*toggled.borrow(), vec![vec![1], vec![0], vec![0, 0]]);

    // leaves don't toggle
    state.click_path(&[2], &key(&[2]))?;
    assert_eq!(toggled.borrow().len(), 3);
    assert!(!state.popup_active());
    Ok(())
}

#[test]
fn readonly_items() -> Result<(), anyhow::Error> {
    let active = Rc::new(Cell::new(false));
    let active2 = active.clone();
    let clicked = Rc::new(Cell::new(0));
    let clicked2 = clicked.clone();

    let menus = menu_tree([MenuItem::new().title("Edit").item(
        MenuItem::new()
            .title("Paste")
            .active(move || active2.get())
            .click(move |_| clicked2.set(clicked2.get() + 1)),
    )]);
    let mut state = MenuBarState::new(menus, None);

    assert!(state.node(&[0, 0]).expect("paste").is_readonly());
    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Inert));
    assert_eq!(clicked.get(), 0);

    active.set(true);
    assert!(!state.node(&[0, 0]).expect("paste").is_readonly());
    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Click));
    assert_eq!(clicked.get(), 1);

    // explicit readonly wins over active
    state.attr(&[0, 0], "readonly", true)?;
    assert!(state.node(&[0, 0]).expect("paste").is_readonly());
    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Inert));
    assert_eq!(clicked.get(), 1);
    Ok(())
}

#[test]
fn hidden_items() -> Result<(), anyhow::Error> {
    let menus = menu_tree([MenuItem::new()
        .title("Edit")
        .item(MenuItem::new().title("Copy").click(|_| {}))]);
    let mut state = MenuBarState::new(menus, None);

    state
        .node_mut(&[0, 0])
        .expect("copy")
        .attr(NodeAttr::Hidden, true);
    assert!(state.node(&[0, 0]).expect("copy").is_hidden());
    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Inert));

    assert!(matches!(
        state.attr(&[0, 5], "hidden", true),
        Err(MenuError::NoSuchNode(_))
    ));
    Ok(())
}

#[test]
fn action_without_handler_is_noop() -> Result<(), anyhow::Error> {
    let clicked = Rc::new(Cell::new(false));
    let clicked2 = clicked.clone();
    let menus = menu_tree([MenuItem::new().title("File").item(
        MenuItem::new()
            .title("Open")
            .action("open.action")
            .click(move |_| clicked2.set(true)),
    )]);
    let mut state = MenuBarState::new(menus, None);

    let r = state.click_path(&[0, 0], &key(&[0, 0]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Noop));
    assert!(!clicked.get());
    Ok(())
}

#[test]
fn misconfigured_items() -> Result<(), anyhow::Error> {
    let menus = menu_tree([
        MenuItem::new().title("File").item(MenuItem::new().title("Open")),
        MenuItem::new().item(MenuItem::new().title("Lost")),
        MenuItem::new(),
    ]);
    let mut state = MenuBarState::new(menus, None);

    let errs = state.validate();
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], MenuError::Misconfigured(path) if path == &vec![1]));

    let node = state.node(&[1]).expect("node");
    assert!(node.is_misconfigured());
    assert_eq!(node.css_class(), Some(DIVIDER_CLASS));

    let r = state.click_path(&[1], &key(&[1]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Inert));
    let r = state.click_path(&[2], &key(&[2]))?;
    assert_eq!(r, MenuOutcome::Activated(Dispatch::Inert));

    assert!(matches!(
        state.click_path(&[7], &key(&[7])),
        Err(MenuError::NoSuchNode(_))
    ));
    Ok(())
}

#[test]
fn record_is_forwarded() -> Result<(), anyhow::Error> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = seen.clone();
    let handler = FnHandler::shared(move |action, record| {
        seen2
            .borrow_mut()
            .push((action.to_string(), record.cloned()));
        Ok(())
    });

    let record = RecordWatch::with(json!({"id": 1}));
    let menus = menu_tree([MenuItem::new()
        .title("Record")
        .item(MenuItem::new().title("Save").action("save"))]);
    let mut state = MenuBarState::with_record(menus, Some(handler), record.clone());

    assert!(state.record().expect("record").same(&record));
    assert_eq!(state.node(&[0, 0]).expect("save").record(), Some(json!({"id": 1})));

    state.click_path(&[0, 0], &key(&[0, 0]))?;
    record.set(Some(json!({"id": 2})));
    state.click_path(&[0, 0], &key(&[0, 0]))?;
    record.set(None);
    state.click_path(&[0, 0], &key(&[0, 0]))?;

    assert_eq!(
        *seen.borrow(),
        vec![
            ("save".to_string(), Some(json!({"id": 1}))),
            ("save".to_string(), Some(json!({"id": 2}))),
            ("save".to_string(), None),
        ]
    );
    Ok(())
}

#[test]
fn click_event_is_passed_on() -> Result<(), anyhow::Error> {
    let seen = Rc::new(RefCell::new(None));
    let seen2 = seen.clone();
    let menus = menu_tree([MenuItem::new()
        .title("File")
        .item(MenuItem::new().title("Exit").click(move |e| {
            *seen2.borrow_mut() = Some(e.clone());
        }))]);
    let mut state = MenuBarState::new(menus, None);

    state.click_path(&[0, 0], &MenuClick::mouse(&[0, 0], (3, 4)))?;
    assert_eq!(
        *seen.borrow(),
        Some(MenuClick {
            path: vec![0, 0],
            pos: Some((3, 4)),
        })
    );
    Ok(())
}
