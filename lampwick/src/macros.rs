/// Creates a single conversation [`Turn`](crate::Turn) from a role shorthand.
///
/// ```rust
/// use lampwick::{Role, lw_turn};
///
/// let turn = lw_turn!(assistant => "Done.");
/// assert_eq!(turn.role, Role::Assistant);
/// assert_eq!(turn.content, "Done.");
/// ```
#[macro_export]
macro_rules! lw_turn {
    (system => $content:expr $(,)?) => {
        $crate::Turn::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Turn::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Turn::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Turn>` from role/content pairs.
///
/// ```rust
/// use lampwick::{Role, lw_turns};
///
/// let turns = lw_turns![
///     system => "You are concise.",
///     user => "Name a prime.",
/// ];
///
/// assert_eq!(turns.len(), 2);
/// assert_eq!(turns[0].role, Role::System);
/// assert_eq!(turns[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! lw_turns {
    () => {
        Vec::<$crate::Turn>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::lw_turn!($role => $content)),+]
    };
}

/// Creates a [`Session`](crate::Session) seeded with prior turns.
///
/// ```rust
/// use lampwick::lw_session;
///
/// let session = lw_session![user => "hi", assistant => "hello"];
/// assert_eq!(session.conversation_records.len(), 2);
/// assert!(lw_session![].conversation_records.is_empty());
/// ```
#[macro_export]
macro_rules! lw_session {
    () => {
        $crate::Session::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        $crate::Session::with_records($crate::lw_turns![$($role => $content),+])
    };
}
