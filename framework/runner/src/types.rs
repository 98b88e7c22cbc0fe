/// Recommended error type for your `main` function and any shared scenario code. This type is
/// compatible with the [crate::definition::HookResult] type so you can use `?` to propagate errors.
pub type TunnelResult<T> = anyhow::Result<T>;
