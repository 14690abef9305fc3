//! latexmk integration: printed Perl snippet for a latexmkrc file.

const TEMPLATE: &str = r#"use Term::ANSIColor;

# Make pdflatex output prettier with hushtex
if (__FORCE__ or rindex($pdflatex, "pdflatex", 0) == 0) {
    $pdflatex = "__CMD__ $pdflatex";
} else {
    # $pdflatex doesn't start with "pdflatex", which means there's some other
    # customisation in latexmkrc already
    my $msg1 = '$pdflatex not recognised so hushtex will not be used.';
    my $msg2 = 'To override this check, use hushtex --latexmkrc --force';
    if (-t STDERR) {
        # Only use colour if a terminal is attached
        print STDERR colored($msg1, 'yellow'), "\n";
        print STDERR colored($msg2, 'yellow'), "\n";
    } else {
        print STDERR $msg1, "\n", $msg2, "\n";
    }
}

# Colour "Running pdflatex" etc messages
{
    no warnings 'redefine';
    my $old_warn_running = \&main::warn_running;
    sub color_warn_running {
        print STDERR color('green');
        $old_warn_running->(@_);
        print STDERR color('reset');
    }
    if (-t STDERR) {
        # Only use colour if a terminal is attached
        *main::warn_running = \&color_warn_running;
    }
}
"#;

/// Renders the latexmkrc snippet, wrapping `$pdflatex` in the given hushtex
/// invocation. With `force`, the `$pdflatex` sanity check is skipped.
pub fn render_latexmkrc(command: &str, force: bool) -> String {
    TEMPLATE
        .replace("__FORCE__", if force { "1" } else { "0" })
        .replace("__CMD__", command)
}
