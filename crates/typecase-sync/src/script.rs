//! Browser runtime generation.
//!
//! The built page ships a small script that performs the same pass as
//! [`Synchronizer`](crate::Synchronizer): read the dropdowns, re-read the
//! stored `data-*` state and rewrite only the fields that differ. Element
//! ids and the marker class are baked in from the [`SelectorSpec`] at
//! build time.

use crate::spec::SelectorSpec;

/// Generate the synchronization script for a page built against `spec`.
///
/// Identifiers are interpolated into string literals, so the spec must have
/// passed [`SelectorSpec::validate`] first; the builder does that before
/// emitting any output.
pub fn sync_client_script(spec: &SelectorSpec) -> String {
    format!(
        r#"(function() {{
  'use strict';

  const FIELDS = ['version', 'style', 'weight'];
  const SELECT_IDS = {{
    version: '{version}',
    style: '{style}',
    weight: '{weight}'
  }};

  function cleanName(name) {{
    return name.replace(/ /g, '-').toLowerCase();
  }}

  const root = document.getElementById('{root}');
  const selects = {{}};
  FIELDS.forEach(function(field) {{
    selects[field] = document.getElementById(SELECT_IDS[field]);
  }});

  // Captured once; elements marked later are not tracked.
  const updatables = Array.prototype.slice.call(
    document.getElementsByClassName('{marker}')
  );

  const stored = {{}};

  function readStored() {{
    FIELDS.forEach(function(field) {{
      stored[field] = root.getAttribute('data-' + field);
    }});
  }}

  function selectedValue(field) {{
    const select = selects[field];
    return cleanName(select.options[select.selectedIndex].value);
  }}

  function applyField(field, current) {{
    const previous = stored[field];
    root.setAttribute('data-' + field, current);
    // New class goes on before the old one comes off.
    updatables.forEach(function(el) {{
      el.classList.add(current);
    }});
    if (previous !== null) {{
      updatables.forEach(function(el) {{
        el.classList.remove(previous);
      }});
    }}
    stored[field] = root.getAttribute('data-' + field);
  }}

  function update() {{
    const current = {{}};
    FIELDS.forEach(function(field) {{
      current[field] = selectedValue(field);
    }});
    readStored();
    FIELDS.forEach(function(field) {{
      if (current[field] !== stored[field]) {{
        applyField(field, current[field]);
      }}
    }});
  }}

  // Every dropdown triggers the same pass, not just the three bound
  // ones; the pass only acts on fields that actually differ.
  Array.prototype.forEach.call(
    document.getElementsByTagName('select'),
    function(select) {{
      select.addEventListener('change', update, false);
      // Some mobile browsers only commit the choice on blur.
      select.addEventListener('blur', update, false);
    }}
  );

  update();
}})();
"#,
        root = spec.root,
        marker = spec.marker,
        version = spec.version,
        style = spec.style,
        weight = spec.weight,
    )
}
