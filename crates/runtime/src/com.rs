//! COM automation backend.
//!
//! Sessions are late-bound `IDispatch` objects created from the versioned
//! ProgID (`RAS507.HECRASController`, ...). Every argument is passed as a
//! `VT_BYREF | VT_VARIANT` pointer into a slot the session owns, so the
//! vendor can write back through any parameter and the slots are read back
//! after the call whatever the parameter direction was.

use std::collections::HashMap;
use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::sync::Arc;

use ras_protocol::{Value, VersionTag};
use tracing::{debug, trace};
use windows::Win32::Foundation::{DISP_E_EXCEPTION, VARIANT_BOOL};
use windows::Win32::System::Com::{
	CLSCTX_LOCAL_SERVER, COINIT_APARTMENTTHREADED, CLSIDFromProgID, CoCreateInstance, CoInitializeEx, CoUninitialize,
	DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPPARAMS, EXCEPINFO, IDispatch, SAFEARRAY,
};
use windows::Win32::System::Ole::{
	SafeArrayCreateVector, SafeArrayDestroy, SafeArrayGetElement, SafeArrayGetLBound, SafeArrayGetUBound,
	SafeArrayGetVartype, SafeArrayPutElement,
};
use windows::Win32::System::Variant::{
	VARENUM, VARIANT, VT_ARRAY, VT_BOOL, VT_BSTR, VT_BYREF, VT_DATE, VT_EMPTY, VT_I2, VT_I4, VT_I8, VT_NULL, VT_R4, VT_R8,
	VT_UI1, VT_VARIANT, VariantClear,
};
use windows::core::{BSTR, GUID, HSTRING, PCWSTR};

use crate::error::{Error, Result};
use crate::native::{Backend, NativeSession};
use crate::process::{ProcessControl, SystemProcesses};
use crate::win32::Win32Windows;
use crate::window::WindowSystem;

const LOCALE_USER_DEFAULT: u32 = 0x0400;

/// Keeps the calling thread in a single-threaded COM apartment.
struct Apartment {
	initialized: bool,
}

impl Apartment {
	fn enter() -> Self {
		let initialized = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.is_ok();
		if !initialized {
			trace!(target = "ras.com", "COM already initialized with another threading model");
		}
		Self { initialized }
	}
}

impl Drop for Apartment {
	fn drop(&mut self) {
		if self.initialized {
			unsafe { CoUninitialize() };
		}
	}
}

/// [`Backend`] that instantiates the registered HEC-RAS automation objects.
#[derive(Debug, Default)]
pub struct ComBackend;

impl ComBackend {
	pub fn new() -> Self {
		Self
	}

	fn create(version: VersionTag, prog_id: &str) -> Result<Box<dyn NativeSession>> {
		let apartment = Apartment::enter();

		let clsid =
			class_id(prog_id).map_err(|e| Error::backend_unavailable(version.as_str(), format!("{prog_id}: {e}")))?;
		let dispatch: IDispatch = unsafe { CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER) }
			.map_err(|e| Error::backend_unavailable(version.as_str(), format!("{prog_id}: {e}")))?;

		debug!(target = "ras.com", %prog_id, "automation object created");
		Ok(Box::new(ComSession {
			version,
			dispatch,
			dispids: HashMap::new(),
			_apartment: apartment,
		}))
	}
}

fn class_id(prog_id: &str) -> windows::core::Result<GUID> {
	unsafe { CLSIDFromProgID(&HSTRING::from(prog_id)) }
}

impl Backend for ComBackend {
	fn launch(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		Self::create(version, &version.controller_prog_id())
	}

	fn geometry(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		Self::create(version, &version.geometry_prog_id())
	}

	fn available_versions(&self) -> Vec<VersionTag> {
		let _apartment = Apartment::enter();
		VersionTag::ALL
			.into_iter()
			.filter(|v| class_id(&v.controller_prog_id()).is_ok())
			.collect()
	}

	fn windows(&self) -> Arc<dyn WindowSystem> {
		Arc::new(Win32Windows)
	}

	fn processes(&self) -> Arc<dyn ProcessControl> {
		Arc::new(SystemProcesses)
	}
}

/// One late-bound automation object.
pub struct ComSession {
	version: VersionTag,
	dispatch: IDispatch,
	dispids: HashMap<String, i32>,
	// dropped after `dispatch`
	_apartment: Apartment,
}

impl ComSession {
	fn dispid(&mut self, method: &str) -> Result<i32> {
		if let Some(id) = self.dispids.get(method) {
			return Ok(*id);
		}
		let name = HSTRING::from(method);
		let names = [PCWSTR(name.as_ptr())];
		let mut id = 0;
		unsafe {
			self.dispatch
				.GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, LOCALE_USER_DEFAULT, &mut id)
		}
		.map_err(|e| Error::Com(format!("{method}: {e}")))?;
		self.dispids.insert(method.to_string(), id);
		Ok(id)
	}
}

impl NativeSession for ComSession {
	fn version(&self) -> VersionTag {
		self.version
	}

	fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
		let id = self.dispid(method)?;

		let mut slots = Slots(Vec::with_capacity(args.len()));
		for arg in &args {
			slots.0.push(to_variant(arg)?);
		}
		// IDispatch takes arguments right to left
		let mut refs: Vec<VARIANT> = (0..slots.0.len())
			.rev()
			.map(|i| by_ref(unsafe { slots.0.as_mut_ptr().add(i) }))
			.collect();

		let params = DISPPARAMS {
			rgvarg: refs.as_mut_ptr(),
			rgdispidNamedArgs: std::ptr::null_mut(),
			cArgs: refs.len() as u32,
			cNamedArgs: 0,
		};
		let mut result = Slots(vec![VARIANT::default()]);
		let mut excep = EXCEPINFO::default();
		let mut arg_err = 0u32;

		trace!(target = "ras.com", method, args = args.len(), "IDispatch::Invoke");
		let call = unsafe {
			self.dispatch.Invoke(
				id,
				&GUID::zeroed(),
				LOCALE_USER_DEFAULT,
				DISPATCH_FLAGS(DISPATCH_METHOD.0 | DISPATCH_PROPERTYGET.0),
				&params,
				Some(result.0.as_mut_ptr()),
				Some(&mut excep),
				Some(&mut arg_err),
			)
		};

		if let Err(err) = call {
			return Err(if err.code() == DISP_E_EXCEPTION {
				Error::NativeCallFailed {
					operation: method.to_string(),
					message: excep.bstrDescription.to_string(),
				}
			} else {
				Error::Com(format!("{method}: {err}"))
			});
		}

		let mut out = Vec::with_capacity(slots.0.len() + 1);
		out.push(from_variant(&result.0[0])?);
		for slot in &slots.0 {
			out.push(from_variant(slot)?);
		}
		Ok(out)
	}
}

/// Owned variants, cleared on drop.
struct Slots(Vec<VARIANT>);

impl Drop for Slots {
	fn drop(&mut self) {
		for v in &mut self.0 {
			unsafe {
				let _ = VariantClear(v);
			}
		}
	}
}

fn vt(v: &VARIANT) -> VARENUM {
	unsafe { v.Anonymous.Anonymous.vt }
}

fn by_ref(target: *mut VARIANT) -> VARIANT {
	let mut v = VARIANT::default();
	unsafe {
		let inner = &mut *v.Anonymous.Anonymous;
		inner.vt = VARENUM(VT_BYREF.0 | VT_VARIANT.0);
		inner.Anonymous.pvarVal = target;
	}
	v
}

fn to_variant(value: &Value) -> Result<VARIANT> {
	let mut v = VARIANT::default();
	unsafe {
		let inner = &mut *v.Anonymous.Anonymous;
		match value {
			Value::Null => inner.vt = VT_EMPTY,
			Value::Bool(b) => {
				inner.vt = VT_BOOL;
				inner.Anonymous.boolVal = VARIANT_BOOL(if *b { -1 } else { 0 });
			}
			Value::Int(i) => {
				let i = i32::try_from(*i).map_err(|_| Error::InvalidArgument(format!("{i} does not fit a Long")))?;
				inner.vt = VT_I4;
				inner.Anonymous.lVal = i;
			}
			Value::Float(f) => {
				inner.vt = VT_R8;
				inner.Anonymous.dblVal = *f;
			}
			Value::Str(s) => {
				inner.vt = VT_BSTR;
				inner.Anonymous.bstrVal = ManuallyDrop::new(BSTR::from(s.as_str()));
			}
			Value::IntSeq(items) => {
				let psa = SafeArrayCreateVector(VT_I4, 0, items.len() as u32);
				for (i, item) in items.iter().enumerate() {
					let item = i32::try_from(*item)
						.map_err(|_| Error::InvalidArgument(format!("{item} does not fit a Long")))?;
					put(psa, i, &item as *const i32 as *const c_void)?;
				}
				inner.vt = VARENUM(VT_ARRAY.0 | VT_I4.0);
				inner.Anonymous.parray = psa;
			}
			Value::FloatSeq(items) => {
				let psa = SafeArrayCreateVector(VT_R8, 0, items.len() as u32);
				for (i, item) in items.iter().enumerate() {
					put(psa, i, item as *const f64 as *const c_void)?;
				}
				inner.vt = VARENUM(VT_ARRAY.0 | VT_R8.0);
				inner.Anonymous.parray = psa;
			}
			Value::StrSeq(items) => {
				let psa = SafeArrayCreateVector(VT_BSTR, 0, items.len() as u32);
				for (i, item) in items.iter().enumerate() {
					let b = BSTR::from(item.as_str());
					// SafeArrayPutElement copies the string
					put(psa, i, b.as_ptr() as *const c_void)?;
				}
				inner.vt = VARENUM(VT_ARRAY.0 | VT_BSTR.0);
				inner.Anonymous.parray = psa;
			}
		}
	}
	Ok(v)
}

unsafe fn put(psa: *mut SAFEARRAY, index: usize, element: *const c_void) -> Result<()> {
	let index = index as i32;
	unsafe { SafeArrayPutElement(psa, &index, element) }.map_err(|e| {
		unsafe {
			let _ = SafeArrayDestroy(psa);
		}
		Error::Com(format!("SafeArrayPutElement: {e}"))
	})
}

fn from_variant(v: &VARIANT) -> Result<Value> {
	let kind = vt(v);
	unsafe {
		let inner = &v.Anonymous.Anonymous;
		if kind.0 & VT_BYREF.0 != 0 && kind.0 & !VT_BYREF.0 == VT_VARIANT.0 {
			return from_variant(&*inner.Anonymous.pvarVal);
		}
		if kind.0 & VT_ARRAY.0 != 0 {
			return from_safearray(inner.Anonymous.parray);
		}
		Ok(match kind {
			VT_EMPTY | VT_NULL => Value::Null,
			VT_BOOL => Value::Bool(inner.Anonymous.boolVal.0 != 0),
			VT_UI1 => Value::Int(inner.Anonymous.bVal as i64),
			VT_I2 => Value::Int(inner.Anonymous.iVal as i64),
			VT_I4 => Value::Int(inner.Anonymous.lVal as i64),
			VT_I8 => Value::Int(inner.Anonymous.llVal),
			VT_R4 => Value::Float(inner.Anonymous.fltVal as f64),
			VT_R8 => Value::Float(inner.Anonymous.dblVal),
			VT_DATE => Value::Float(inner.Anonymous.date),
			VT_BSTR => Value::Str(inner.Anonymous.bstrVal.to_string()),
			other => return Err(Error::Com(format!("unsupported VARIANT type {}", other.0))),
		})
	}
}

unsafe fn from_safearray(psa: *const SAFEARRAY) -> Result<Value> {
	if psa.is_null() {
		return Ok(Value::Null);
	}
	let com = |e: windows::core::Error| Error::Com(format!("SAFEARRAY: {e}"));
	let (kind, lower, upper) = unsafe {
		(
			SafeArrayGetVartype(psa).map_err(com)?,
			SafeArrayGetLBound(psa, 1).map_err(com)?,
			SafeArrayGetUBound(psa, 1).map_err(com)?,
		)
	};

	let mut items = Vec::with_capacity((upper - lower + 1).max(0) as usize);
	for i in lower..=upper {
		let item = unsafe {
			match kind {
				VT_R8 | VT_DATE => {
					let mut x = 0f64;
					SafeArrayGetElement(psa, &i, &mut x as *mut f64 as *mut c_void).map_err(com)?;
					Value::Float(x)
				}
				VT_R4 => {
					let mut x = 0f32;
					SafeArrayGetElement(psa, &i, &mut x as *mut f32 as *mut c_void).map_err(com)?;
					Value::Float(x as f64)
				}
				VT_I4 => {
					let mut x = 0i32;
					SafeArrayGetElement(psa, &i, &mut x as *mut i32 as *mut c_void).map_err(com)?;
					Value::Int(x as i64)
				}
				VT_I2 => {
					let mut x = 0i16;
					SafeArrayGetElement(psa, &i, &mut x as *mut i16 as *mut c_void).map_err(com)?;
					Value::Int(x as i64)
				}
				VT_BSTR => {
					let mut x = BSTR::new();
					SafeArrayGetElement(psa, &i, &mut x as *mut BSTR as *mut c_void).map_err(com)?;
					Value::Str(x.to_string())
				}
				VT_VARIANT => {
					let mut x = Slots(vec![VARIANT::default()]);
					SafeArrayGetElement(psa, &i, x.0.as_mut_ptr() as *mut c_void).map_err(com)?;
					from_variant(&x.0[0])?
				}
				other => return Err(Error::Com(format!("unsupported SAFEARRAY element type {}", other.0))),
			}
		};
		items.push(item);
	}
	Ok(collect_seq(items))
}

fn collect_seq(items: Vec<Value>) -> Value {
	if items.iter().all(|v| matches!(v, Value::Float(_))) {
		Value::FloatSeq(items.into_iter().filter_map(|v| v.as_f64()).collect())
	} else if items.iter().all(|v| matches!(v, Value::Int(_))) {
		Value::IntSeq(items.into_iter().filter_map(|v| v.as_i64()).collect())
	} else {
		Value::StrSeq(
			items
				.into_iter()
				.map(|v| match v {
					Value::Float(x) => x.to_string(),
					Value::Int(x) => x.to_string(),
					Value::Bool(x) => x.to_string(),
					other => other.into_string().unwrap_or_default(),
				})
				.collect(),
		)
	}
}
