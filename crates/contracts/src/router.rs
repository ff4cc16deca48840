//! Transaction routing: function name + string arguments → repository call.

use serde::Serialize;

use chainmetric_ledger::Ledger;

use crate::device::DeviceRepository;
use crate::error::{ContractError, ContractResult};
use crate::keys::SuffixGenerator;
use crate::requirements::RequirementsRepository;

/// A contract invocable by function name (transaction router abstraction).
///
/// The host hands every transaction over as a function name and a list of
/// string arguments. `invoke` resolves the name, checks the argument count,
/// runs the matching repository operation and encodes its result.
///
/// ## Responses
///
/// - **Reads** (`Retrieve`, `All`, `ListAll`, ...): the JSON document or array
/// - **Creates** (`Register`, `Insert`): the raw bytes of the new id
/// - **Exists**: `true` / `false`
/// - **Deletes** (`Unbind`, `Remove`, `RemoveAll`): empty
///
/// ## Bulk removal
///
/// `RemoveAll` is only routed when the repository was built with an
/// [`crate::AdminCapability`]; otherwise it fails with
/// [`ContractError::AdminDisabled`] before touching state.
pub trait Contract {
    fn name(&self) -> &'static str;

    fn invoke(&self, function: &str, args: &[&str]) -> ContractResult<Vec<u8>>;
}

impl<L, G> Contract for DeviceRepository<L, G>
where
    L: Ledger,
    G: SuffixGenerator,
{
    fn name(&self) -> &'static str {
        "devices"
    }

    fn invoke(&self, function: &str, args: &[&str]) -> ContractResult<Vec<u8>> {
        tracing::debug!(contract = self.name(), function, args = args.len(), "invoke");

        match function {
            "Retrieve" => {
                let [id] = arity::<1>(function, args)?;
                json(&self.retrieve(id)?)
            }
            "All" => {
                let [] = arity::<0>(function, args)?;
                json(&self.all()?)
            }
            "Register" => {
                let [payload] = arity::<1>(function, args)?;
                Ok(self.register(payload.as_bytes())?.into_bytes())
            }
            "Update" => {
                let [id, payload] = arity::<2>(function, args)?;
                json(&self.update(id, payload.as_bytes())?)
            }
            "Exists" => {
                let [id] = arity::<1>(function, args)?;
                json(&self.exists(id)?)
            }
            "Unbind" => {
                let [id] = arity::<1>(function, args)?;
                self.unbind(id)?;
                Ok(Vec::new())
            }
            "RemoveAll" => {
                let [] = arity::<0>(function, args)?;
                let admin = self.admin().ok_or(ContractError::AdminDisabled)?;
                self.remove_all(&admin)?;
                Ok(Vec::new())
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }
}

impl<L, G> Contract for RequirementsRepository<L, G>
where
    L: Ledger,
    G: SuffixGenerator,
{
    fn name(&self) -> &'static str {
        "requirements"
    }

    fn invoke(&self, function: &str, args: &[&str]) -> ContractResult<Vec<u8>> {
        tracing::debug!(contract = self.name(), function, args = args.len(), "invoke");

        match function {
            "Retrieve" => {
                let [id] = arity::<1>(function, args)?;
                json(&self.retrieve(id)?)
            }
            "ListAll" => {
                let [] = arity::<0>(function, args)?;
                json(&self.list_all()?)
            }
            "ListForAsset" => {
                let [asset_id] = arity::<1>(function, args)?;
                json(&self.list_for_asset(asset_id)?)
            }
            "Insert" => {
                let [payload] = arity::<1>(function, args)?;
                Ok(self.insert(payload.as_bytes())?.into_bytes())
            }
            "Exists" => {
                let [id] = arity::<1>(function, args)?;
                json(&self.exists(id)?)
            }
            "Remove" => {
                let [id] = arity::<1>(function, args)?;
                self.remove(id)?;
                Ok(Vec::new())
            }
            "RemoveAll" => {
                let [] = arity::<0>(function, args)?;
                let admin = self.admin().ok_or(ContractError::AdminDisabled)?;
                self.remove_all(&admin)?;
                Ok(Vec::new())
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }
}

fn arity<'a, const N: usize>(function: &str, args: &[&'a str]) -> ContractResult<[&'a str; N]> {
    <[&'a str; N]>::try_from(args).map_err(|_| ContractError::InvalidArguments {
        function: function.to_string(),
        reason: format!("expected {N} argument(s), got {}", args.len()),
    })
}

fn json<T: Serialize + ?Sized>(value: &T) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(ContractError::Response)
}
