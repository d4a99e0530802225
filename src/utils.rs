#[macro_export]
/// Prefixes a message with the calling function's name and suffixes it with the
/// source location. Meant to be handed to anyhow's `with_context`:
///
/// `.with_context(|| context!("Cannot open record {:?}", path))?`
///
/// Takes the same arguments as `format!()`.
macro_rules! context {
    ($str_literal:expr, $($arg:expr),*) => {
        format!(concat!("{}(): ", $str_literal, " file: {}, line: {}."),
                   $crate::function_name!(), $($arg),*, std::file!(), std::line!())
    };
    ($str_literal:expr) => {
        format!(concat!("{}(): ", $str_literal, " file: {}, line: {}."),
                   $crate::function_name!(), std::file!(), std::line!())
    };
}

#[macro_export]
/// Name of the enclosing function. Closure segments are cut off, so a call from
/// inside `run::{{closure}}` still reports `child_capture::runner::run`.
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // Drop the trailing "::f".
        let name = &name[..name.len() - 3];
        match name.find("::{{closure}}") {
            Some(pos) => &name[..pos],
            None => name,
        }
    }};
}
