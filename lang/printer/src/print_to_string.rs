use crate::types::*;

pub trait PrintToString {
    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String;

    /// Render with the maximally explicit [PrintCfg::trace] configuration.
    /// Intended for `log::trace!` output.
    fn print_trace(&self) -> String;
}

impl<T: Print> PrintToString for T {
    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String {
        let alloc = Alloc::new();
        let mut buf = Vec::new();
        {
            let default_cfg = PrintCfg::default();
            let cfg = cfg.unwrap_or(&default_cfg);
            let doc_builder = self.print(cfg, &alloc);
            doc_builder.1.render(cfg.width, &mut buf).expect("Failed to print to string");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn print_trace(&self) -> String {
        self.print_to_string(Some(&PrintCfg::trace()))
    }
}
