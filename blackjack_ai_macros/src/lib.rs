use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use syn::parse_quote;

/// This macro is added before a method of the `Table` struct in the impl
/// block. Use this macro to first check if the current game phase is exactly
/// the phase in the attribute.
///
/// For example, `#[allowed_phase(PlayerTurn)]` makes a method first check
/// that the table is in the `PlayerTurn` phase. If not, the method returns
/// `GameError::WrongPhase` naming the method and both phases.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = syn::parse2(TokenStream2::from(item)).unwrap();
    let phase: syn::Ident = syn::parse2(TokenStream2::from(attr)).unwrap();
    let method = ast.sig.ident.to_string();
    let guard: syn::Stmt = parse_quote! {
        if self.phase != GamePhase::#phase {
            return Err(GameError::WrongPhase {
                method: #method,
                expected: GamePhase::#phase,
                found: self.phase,
            });
        }
    };
    ast.block.stmts.insert(0, guard);
    ast.into_token_stream().into()
}
