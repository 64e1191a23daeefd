//! Stack-based text menu navigation.
//!
//! A [`MenuSystem`] keeps every visited menu on a stack together with a
//! pointer to the one on screen. Three reserved inputs move the pointer
//! (back, forward, main menu); anything else is handed to the current
//! menu, which answers with a [`MenuOutcome`].

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs reserved for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationKeys {
    /// Step to the previous menu.
    pub back: String,
    /// Step to the next menu in the history.
    pub forward: String,
    /// Jump to the root menu.
    pub main_menu: String,
}

impl Default for NavigationKeys {
    fn default() -> Self {
        Self {
            back: "b".to_string(),
            forward: "f".to_string(),
            main_menu: "m".to_string(),
        }
    }
}

/// Navigation triggered by a reserved key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Previous entry in the stack.
    Back,
    /// Next entry in the stack.
    Forward,
    /// Root menu.
    MainMenu,
}

/// What a menu wants to happen after handling a line of input.
#[derive(Debug)]
pub enum MenuOutcome<M> {
    /// Remain on the current menu.
    Stay,
    /// Push a new menu after the current one and show it.
    Open(M),
    /// Go back one menu.
    Back,
    /// Return to the root menu.
    MainMenu,
    /// Leave the application.
    Exit,
}

/// A screen in the menu system.
pub trait Menu: Sized {
    /// State shared by all menus, passed in explicitly on every call.
    type Context;

    /// Short name shown as the screen title.
    fn title(&self) -> &str;

    /// Body text of the menu.
    fn lines(&self, ctx: &Self::Context) -> Vec<String>;

    /// Whether the shared header lines precede the body.
    fn show_headers(&self) -> bool {
        true
    }

    /// React to a line that is not a navigation key.
    fn handle_input(&mut self, input: &str, ctx: &mut Self::Context) -> MenuOutcome<Self>;
}

/// Effect of submitting one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A reserved key moved the pointer (or tried to).
    Navigated(Navigation),
    /// The current menu handled the input.
    Handled,
    /// The menu asked to quit.
    Exit,
}

/// Menu stack with a movable current pointer.
#[derive(Debug)]
pub struct MenuSystem<M> {
    keys: NavigationKeys,
    headers: Vec<String>,
    stack: Vec<M>,
    current: usize,
}

impl<M: Menu> MenuSystem<M> {
    /// Start with `main_menu` as root and current menu.
    pub fn new(main_menu: M, keys: NavigationKeys) -> Self {
        Self {
            keys,
            headers: Vec::new(),
            stack: vec![main_menu],
            current: 0,
        }
    }

    /// Reserved navigation inputs.
    pub fn keys(&self) -> &NavigationKeys {
        &self.keys
    }

    /// Replace the header with a legend of the navigation keys.
    pub fn set_default_headers(&mut self) {
        self.headers = vec![
            "-------Navigation------".to_string(),
            format!(
                "{} - back  {} - forward  {} - main menu",
                self.keys.back, self.keys.forward, self.keys.main_menu
            ),
            "-----------------------".to_string(),
            String::new(),
        ];
    }

    /// Lines printed above menus that show headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Menu on screen.
    pub fn current(&self) -> &M {
        &self.stack[self.current]
    }

    /// Menu on screen, mutably.
    pub fn current_mut(&mut self) -> &mut M {
        &mut self.stack[self.current]
    }

    /// Index of the current menu in the stack.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Number of menus on the stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Move to the next deeper menu. Returns `false` at the top of the stack.
    pub fn navigate_forward(&mut self) -> bool {
        if self.current + 1 < self.stack.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous menu. Returns `false` at the root.
    pub fn navigate_back(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Drop forward history and make `menu` current.
    pub fn navigate_to(&mut self, menu: M) {
        self.stack.truncate(self.current + 1);
        debug!(from = self.current().title(), to = menu.title(), "opening menu");
        self.stack.push(menu);
        self.current = self.stack.len() - 1;
    }

    /// Point back at the root menu, keeping the history.
    pub fn show_main(&mut self) {
        self.current = 0;
    }

    /// Navigation bound to `input`, if it is a reserved key.
    pub fn reserved(&self, input: &str) -> Option<Navigation> {
        let input = input.trim();
        if input == self.keys.back {
            Some(Navigation::Back)
        } else if input == self.keys.forward {
            Some(Navigation::Forward)
        } else if input == self.keys.main_menu {
            Some(Navigation::MainMenu)
        } else {
            None
        }
    }

    /// Apply a navigation; returns whether the pointer moved.
    pub fn navigate(&mut self, navigation: Navigation) -> bool {
        match navigation {
            Navigation::Back => self.navigate_back(),
            Navigation::Forward => self.navigate_forward(),
            Navigation::MainMenu => {
                let moved = self.current != 0;
                self.show_main();
                moved
            }
        }
    }

    /// Text of the current screen: headers (if enabled) then menu body.
    pub fn screen(&self, ctx: &M::Context) -> Vec<String> {
        let menu = self.current();
        let mut lines = Vec::new();
        if menu.show_headers() {
            lines.extend(self.headers.iter().cloned());
        }
        lines.extend(menu.lines(ctx));
        lines
    }

    /// Feed one line of input to the system.
    pub fn submit(&mut self, input: &str, ctx: &mut M::Context) -> Step {
        if let Some(navigation) = self.reserved(input) {
            self.navigate(navigation);
            return Step::Navigated(navigation);
        }

        match self.current_mut().handle_input(input, ctx) {
            MenuOutcome::Stay => Step::Handled,
            MenuOutcome::Open(menu) => {
                self.navigate_to(menu);
                Step::Handled
            }
            MenuOutcome::Back => {
                self.navigate_back();
                Step::Handled
            }
            MenuOutcome::MainMenu => {
                self.show_main();
                Step::Handled
            }
            MenuOutcome::Exit => Step::Exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestMenu {
        Main,
        First,
        Second,
        Adder { values: Vec<i64> },
    }

    impl Menu for TestMenu {
        type Context = Vec<String>;

        fn title(&self) -> &str {
            match self {
                TestMenu::Main => "Main",
                TestMenu::First => "Test 1",
                TestMenu::Second => "Test 2",
                TestMenu::Adder { .. } => "Addition",
            }
        }

        fn lines(&self, _ctx: &Self::Context) -> Vec<String> {
            vec![format!("This is {}", self.title())]
        }

        fn show_headers(&self) -> bool {
            !matches!(self, TestMenu::Main)
        }

        fn handle_input(&mut self, input: &str, log: &mut Self::Context) -> MenuOutcome<Self> {
            match (self, input) {
                (TestMenu::Main, "1") => MenuOutcome::Open(TestMenu::First),
                (TestMenu::Main, "2") => MenuOutcome::Open(TestMenu::Second),
                (TestMenu::Main, "3") => MenuOutcome::Exit,
                (TestMenu::First, "1") => MenuOutcome::Open(TestMenu::Second),
                (TestMenu::Second, "0") => MenuOutcome::Back,
                (TestMenu::Second, "3") => MenuOutcome::Open(TestMenu::Adder { values: Vec::new() }),
                (TestMenu::Adder { values }, raw) => match raw.parse::<i64>() {
                    Ok(value) => {
                        values.push(value);
                        if values.len() == 2 {
                            log.push(format!("Sum = {}", values.iter().sum::<i64>()));
                            values.clear();
                            MenuOutcome::MainMenu
                        } else {
                            MenuOutcome::Stay
                        }
                    }
                    Err(_) => {
                        log.push("not a number".to_string());
                        MenuOutcome::Stay
                    }
                },
                (_, other) => {
                    log.push(format!("invalid input {other}"));
                    MenuOutcome::Stay
                }
            }
        }
    }

    fn system() -> MenuSystem<TestMenu> {
        let mut system = MenuSystem::new(TestMenu::Main, NavigationKeys::default());
        system.set_default_headers();
        system
    }

    #[test]
    fn back_and_forward_walk_the_history() {
        let mut system = system();
        let mut log = Vec::new();

        system.submit("1", &mut log);
        system.submit("1", &mut log);
        assert_eq!(system.current(), &TestMenu::Second);
        assert_eq!(system.depth(), 3);

        assert_eq!(system.submit("b", &mut log), Step::Navigated(Navigation::Back));
        assert_eq!(system.current(), &TestMenu::First);
        system.submit("b", &mut log);
        assert_eq!(system.current(), &TestMenu::Main);

        assert!(!system.navigate_back());
        assert_eq!(system.position(), 0);

        system.submit("f", &mut log);
        system.submit("f", &mut log);
        assert_eq!(system.current(), &TestMenu::Second);
        assert!(!system.navigate_forward());
    }

    #[test]
    fn navigate_to_truncates_forward_history() {
        let mut system = system();
        let mut log = Vec::new();

        system.submit("1", &mut log);
        system.submit("1", &mut log);
        system.submit("b", &mut log);
        system.submit("b", &mut log);
        system.submit("2", &mut log);

        assert_eq!(system.depth(), 2);
        assert_eq!(system.current(), &TestMenu::Second);
        assert!(!system.navigate_forward());
    }

    #[test]
    fn main_key_resets_pointer_but_keeps_stack() {
        let mut system = system();
        let mut log = Vec::new();

        system.submit("1", &mut log);
        system.submit("1", &mut log);
        assert_eq!(system.submit(" m ", &mut log), Step::Navigated(Navigation::MainMenu));
        assert_eq!(system.current(), &TestMenu::Main);
        assert_eq!(system.depth(), 3);

        system.submit("f", &mut log);
        assert_eq!(system.current(), &TestMenu::First);
    }

    #[test]
    fn other_input_reaches_the_menu_handler() {
        let mut system = system();
        let mut log = Vec::new();

        system.submit("2", &mut log);
        system.submit("3", &mut log);
        assert_eq!(system.current().title(), "Addition");

        system.submit("x", &mut log);
        system.submit("4", &mut log);
        assert_eq!(system.submit("5", &mut log), Step::Handled);
        assert_eq!(log, vec!["not a number".to_string(), "Sum = 9".to_string()]);
        assert_eq!(system.current(), &TestMenu::Main);

        assert_eq!(system.submit("3", &mut log), Step::Exit);
    }

    #[test]
    fn handler_can_send_the_pointer_back() {
        let mut system = system();
        let mut log = Vec::new();

        system.submit("1", &mut log);
        system.submit("1", &mut log);
        assert_eq!(system.current(), &TestMenu::Second);

        assert_eq!(system.submit("0", &mut log), Step::Handled);
        assert_eq!(system.current(), &TestMenu::First);
        assert_eq!(system.depth(), 3);
        assert!(log.is_empty());

        system.submit("f", &mut log);
        assert_eq!(system.current(), &TestMenu::Second);
    }

    #[test]
    fn screen_prefixes_headers_when_enabled() {
        let mut system = system();
        let mut log = Vec::new();

        assert_eq!(system.screen(&log), vec!["This is Main".to_string()]);

        system.submit("1", &mut log);
        let screen = system.screen(&log);
        assert_eq!(screen[0], "-------Navigation------");
        assert_eq!(screen[1], "b - back  f - forward  m - main menu");
        assert_eq!(screen.last().map(String::as_str), Some("This is Test 1"));
    }

    #[test]
    fn custom_keys_are_honoured() {
        let keys = NavigationKeys {
            back: "<".to_string(),
            forward: ">".to_string(),
            main_menu: "home".to_string(),
        };
        let mut system = MenuSystem::new(TestMenu::Main, keys);
        let mut log = Vec::new();

        system.submit("1", &mut log);
        assert_eq!(system.reserved("b"), None);
        system.submit("<", &mut log);
        assert_eq!(system.current(), &TestMenu::Main);
        system.submit(">", &mut log);
        system.submit("home", &mut log);
        assert_eq!(system.position(), 0);
    }
}
